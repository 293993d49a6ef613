#![doc = include_str!("../README.md")]

/// Derive [`Model`] and `Decode` for a struct with named fields.
///
/// See the `vista` crate documentation for the supported attributes.
///
/// [`Model`]: https://docs.rs/vista/latest/vista/trait.Model.html
#[proc_macro_derive(Model, attributes(model))]
pub fn derive_model(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    vista_macros_impl::derive_model(input.into()).into()
}
