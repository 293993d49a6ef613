#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub use vista_core::*;

#[doc = include_str!("derive_model.md")]
pub use vista_macros::*;
