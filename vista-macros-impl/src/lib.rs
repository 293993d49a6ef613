#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

use proc_macro2::TokenStream;
use unsynn::*;

mod grammar;
use grammar::DeriveInput;

mod attrs;

mod error;
pub use error::{ModelError, to_compile_errors};

pub mod shape;

mod process_struct;
use process_struct::{ModelStruct, process_struct};

/// Entry point for `#[derive(Model)]`.
///
/// Always returns tokens: either the generated implementations or one
/// `compile_error!` per problem found in the input.
pub fn derive_model(input: TokenStream) -> TokenStream {
    let span = input
        .clone()
        .into_iter()
        .next()
        .map_or_else(proc_macro2::Span::call_site, |tt| tt.span());

    let decl = match input.to_token_iter().parse::<DeriveInput>() {
        Ok(DeriveInput::Struct(decl)) => decl,
        Ok(DeriveInput::Enum(decl)) => {
            return ModelError::new(
                "#[derive(Model)] only supports structs with named fields, not enums",
                decl.fourth.span(),
            )
            .to_compile_error();
        }
        Ok(DeriveInput::Union(decl)) => {
            return ModelError::new(
                "#[derive(Model)] only supports structs with named fields, not unions",
                decl.fourth.span(),
            )
            .to_compile_error();
        }
        Err(_) => {
            return ModelError::new("#[derive(Model)] expects a struct", span).to_compile_error();
        }
    };

    match ModelStruct::from_decl(decl) {
        Ok(model) => process_struct(&model),
        Err(errors) => to_compile_errors(&errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn errors_of(output: &TokenStream) -> Vec<String> {
        // every error renders as `:: core :: compile_error ! ("...") ;`
        let mut messages = Vec::new();
        let tokens: Vec<_> = output.clone().into_iter().collect();
        for window in tokens.windows(2) {
            if let [proc_macro2::TokenTree::Punct(bang), proc_macro2::TokenTree::Group(args)] = window
                && bang.as_char() == '!'
            {
                messages.push(args.stream().to_string());
            }
        }
        messages
    }

    #[test]
    fn generates_both_impls() {
        let output = derive_model(quote! {
            struct Toot {
                id: i64,
                #[model(key = "content")]
                text: Option<String>,
                #[model(ignored)]
                seen: bool,
            }
        });
        let expected = quote! {
            #[automatically_derived]
            impl ::vista::Model for Toot {
                #[allow(unused_variables)]
                fn from_view(view: ::vista::JsonView<'_>) -> Self {
                    Self {
                        id: view.member("id").int_as::<i64>(),
                        text: view.member("content").string_opt(),
                        seen: ::core::default::Default::default(),
                    }
                }
            }

            #[automatically_derived]
            impl ::vista::Decode for Toot {
                fn decode_view(view: ::vista::JsonView<'_>) -> Self {
                    ::vista::decode_record(view)
                }
            }
        };
        assert_eq!(output.to_string(), expected.to_string());
    }

    #[test]
    fn container_attributes_reach_the_impl() {
        let output = derive_model(quote! {
            #[model(policy = crate::LENIENT, crate = vista_core)]
            pub struct Flags {
                #[model(flatten)]
                inner: Inner,
            }
        });
        let expected = quote! {
            #[automatically_derived]
            impl vista_core::Model for Flags {
                const POLICY: ::core::option::Option<&'static vista_core::Policy> =
                    ::core::option::Option::Some(&crate::LENIENT);

                #[allow(unused_variables)]
                fn from_view(view: vista_core::JsonView<'_>) -> Self {
                    Self {
                        inner: <Inner as vista_core::Decode>::decode_view(view),
                    }
                }
            }

            #[automatically_derived]
            impl vista_core::Decode for Flags {
                fn decode_view(view: vista_core::JsonView<'_>) -> Self {
                    vista_core::decode_record(view)
                }
            }
        };
        assert_eq!(output.to_string(), expected.to_string());
    }

    #[test]
    fn raw_identifiers_use_the_plain_key() {
        let output = derive_model(quote! {
            struct Item { r#type: String }
        });
        assert!(output.to_string().contains(&quote!(view.member("type").string()).to_string()));
    }

    #[test]
    fn rejects_non_structs() {
        let output = derive_model(quote! { enum Kind { A, B } });
        assert_eq!(
            errors_of(&output),
            [quote!("#[derive(Model)] only supports structs with named fields, not enums").to_string()]
        );

        let output = derive_model(quote! { pub union Bits { a: u32, b: f32 } });
        assert_eq!(
            errors_of(&output),
            [quote!("#[derive(Model)] only supports structs with named fields, not unions").to_string()]
        );

        let output = derive_model(quote! { struct Id(i64); });
        assert_eq!(
            errors_of(&output),
            [quote!("#[derive(Model)] needs named fields; tuple structs have no member names").to_string()]
        );
    }

    #[test]
    fn reports_every_bad_field() {
        let output = derive_model(quote! {
            struct Bad<T> {
                a: &'static str,
                b: Option<Option<i64>>,
                c: i64,
                #[model(nope)]
                d: i64,
            }
        });
        let errors = errors_of(&output);
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("generic structs"));
        assert!(errors[1].contains("references"));
        assert!(errors[2].contains("Option<Option<_>>"));
        assert!(errors[3].contains("unknown model attribute `nope`"));
    }
}
