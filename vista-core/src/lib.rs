#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Warn-level logging macro that forwards to `tracing::warn!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! warning {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

/// Warn-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! warning {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use trace;
#[allow(unused_imports)]
pub(crate) use warning;

mod document;
pub use document::{Document, DocumentError, DocumentErrorKind};

mod view;
pub use view::JsonView;

pub mod coerce;

mod policy;
pub use policy::{Extract, Policy};

mod path;
pub use path::PathItem;

mod decode;
pub use decode::{
    Decode, from_slice, from_slice_at, from_slice_with, from_str, from_str_at, from_str_with,
    from_utf16, from_view,
};

mod model;
pub use model::{Model, decode_record};

pub use time::OffsetDateTime;
pub use url::Url;
