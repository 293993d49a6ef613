use proc_macro2::{Span, TokenStream};
use quote::quote_spanned;

/// An input the derive cannot handle.
///
/// Each error becomes a `compile_error!` pointing at the offending tokens.
#[derive(Debug, Clone)]
pub struct ModelError {
    /// What to tell the user
    pub message: String,
    /// Where to point
    pub span: Span,
}

impl ModelError {
    /// Create an error pointing at `span`.
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ModelError {
            message: message.into(),
            span,
        }
    }

    /// Render as a `compile_error!` invocation.
    pub fn to_compile_error(&self) -> TokenStream {
        let message = &self.message;
        quote_spanned! { self.span => ::core::compile_error!(#message); }
    }
}

/// Render a batch of errors.
pub fn to_compile_errors(errors: &[ModelError]) -> TokenStream {
    errors.iter().map(ModelError::to_compile_error).collect()
}
