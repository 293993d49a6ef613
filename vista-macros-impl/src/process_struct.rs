use proc_macro2::{Ident, Literal, TokenStream};
use quote::{format_ident, quote};
use unsynn::*;

use crate::attrs::{ContainerAttrs, FieldAttrs};
use crate::grammar::{FieldDecl, StructDecl, StructBody, split_top_level_commas};
use crate::shape::{Scalar, TypeShape};
use crate::ModelError;

/// Where a field's value comes from.
pub(crate) enum Source {
    /// The member named by the literal.
    Member(Literal),
    /// The record's own view.
    Flatten,
    /// Not read at all.
    Ignored,
}

/// A field ready for code generation.
pub(crate) struct ModelField {
    pub(crate) name: Ident,
    pub(crate) source: Source,
    pub(crate) shape: Option<TypeShape>,
}

/// A struct ready for code generation.
pub(crate) struct ModelStruct {
    pub(crate) name: Ident,
    pub(crate) attrs: ContainerAttrs,
    pub(crate) fields: Vec<ModelField>,
}

impl ModelStruct {
    /// Validate a parsed struct, collecting every problem rather than stopping at the first.
    pub(crate) fn from_decl(decl: StructDecl) -> std::result::Result<Self, Vec<ModelError>> {
        let name_span = decl.name.span();
        let mut errors = Vec::new();

        if !decl.generics.to_token_stream().is_empty() {
            errors.push(ModelError::new(
                "#[derive(Model)] does not support generic structs",
                name_span,
            ));
        }

        let attrs = ContainerAttrs::parse(&decl.attributes).unwrap_or_else(|err| {
            errors.push(err);
            ContainerAttrs::default()
        });

        let body = match decl.body {
            StructBody::Named(body) => body.0.stream(),
            StructBody::Tuple(_) => {
                errors.push(ModelError::new(
                    "#[derive(Model)] needs named fields; tuple structs have no member names",
                    name_span,
                ));
                TokenStream::new()
            }
            StructBody::Unit(_) => {
                errors.push(ModelError::new(
                    "#[derive(Model)] needs named fields; unit structs have nothing to decode",
                    name_span,
                ));
                TokenStream::new()
            }
        };

        let mut fields = Vec::new();
        for piece in split_top_level_commas(body) {
            match ModelField::from_tokens(piece) {
                Ok(field) => fields.push(field),
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(ModelStruct {
                name: decl.name,
                attrs,
                fields,
            })
        } else {
            Err(errors)
        }
    }
}

impl ModelField {
    fn from_tokens(tokens: TokenStream) -> std::result::Result<Self, ModelError> {
        let span = tokens
            .clone()
            .into_iter()
            .next()
            .map_or_else(proc_macro2::Span::call_site, |tt| tt.span());
        let decl = tokens
            .to_token_iter()
            .parse::<FieldDecl>()
            .map_err(|_| ModelError::new("expected a named field `name: Type`", span))?;

        let attrs = FieldAttrs::parse(&decl.attributes)?;
        let name = decl.name;

        if attrs.ignored {
            return Ok(ModelField {
                name,
                source: Source::Ignored,
                shape: None,
            });
        }

        let shape = TypeShape::classify(&decl.typ)?;
        let source = if attrs.flatten {
            Source::Flatten
        } else {
            let key = attrs.key.unwrap_or_else(|| {
                let text = name.to_string();
                let mut lit = Literal::string(text.strip_prefix("r#").unwrap_or(&text));
                lit.set_span(name.span());
                lit
            });
            Source::Member(key)
        };

        Ok(ModelField {
            name,
            source,
            shape: Some(shape),
        })
    }
}

/// Generate `Model` and `Decode` implementations.
pub(crate) fn process_struct(model: &ModelStruct) -> TokenStream {
    let name = &model.name;
    let krate = model
        .attrs
        .krate
        .clone()
        .unwrap_or_else(|| quote! { ::vista });

    let policy = model.attrs.policy.as_ref().map(|policy| {
        quote! {
            const POLICY: ::core::option::Option<&'static #krate::Policy> =
                ::core::option::Option::Some(&#policy);
        }
    });

    let view = format_ident!("view");
    let inits = model.fields.iter().map(|field| {
        let field_name = &field.name;
        let value = match (&field.source, &field.shape) {
            (Source::Member(key), Some(shape)) => {
                read_field(shape, quote! { #view.member(#key) }, &krate)
            }
            (Source::Flatten, Some(shape)) => read_field(shape, quote! { #view }, &krate),
            _ => quote! { ::core::default::Default::default() },
        };
        quote! { #field_name: #value, }
    });

    quote! {
        #[automatically_derived]
        impl #krate::Model for #name {
            #policy

            #[allow(unused_variables)]
            fn from_view(#view: #krate::JsonView<'_>) -> Self {
                Self {
                    #(#inits)*
                }
            }
        }

        #[automatically_derived]
        impl #krate::Decode for #name {
            fn decode_view(view: #krate::JsonView<'_>) -> Self {
                #krate::decode_record(view)
            }
        }
    }
}

/// The expression reading a required value of `shape` out of `view`.
pub(crate) fn read_field(shape: &TypeShape, view: TokenStream, krate: &TokenStream) -> TokenStream {
    match shape {
        TypeShape::Scalar(scalar) => match scalar {
            Scalar::Bool => quote! { #view.bool() },
            Scalar::Int(ty) => quote! { #view.int_as::<#ty>() },
            Scalar::UInt(ty) => quote! { #view.uint_as::<#ty>() },
            Scalar::F64 => quote! { #view.double() },
            Scalar::F32 => quote! { (#view.double() as f32) },
            Scalar::String => quote! { #view.string() },
            Scalar::Url => quote! { #view.url() },
            Scalar::Date => quote! { #view.date() },
        },
        TypeShape::Optional(inner) => read_optional(inner, view, krate),
        TypeShape::Sequence(inner) => {
            let element = read_field(inner, quote! { v }, krate);
            quote! {
                #view.elements().map(|v| #element).collect::<::std::vec::Vec<_>>()
            }
        }
        TypeShape::Keyed(map, inner) => {
            let value = read_field(inner, quote! { v }, krate);
            quote! {
                #view
                    .entries()
                    .map(|(k, v)| (::std::string::String::from(k), #value))
                    .collect::<#map>()
            }
        }
        TypeShape::Record(ty) => quote! { <#ty as #krate::Decode>::decode_view(#view) },
    }
}

/// The expression reading an `Option` of `shape` out of `view`.
fn read_optional(shape: &TypeShape, view: TokenStream, krate: &TokenStream) -> TokenStream {
    match shape {
        TypeShape::Scalar(scalar) => match scalar {
            Scalar::Bool => quote! { #view.bool_opt() },
            Scalar::Int(ty) => quote! { #view.int_as_opt::<#ty>() },
            Scalar::UInt(ty) => quote! { #view.uint_as_opt::<#ty>() },
            Scalar::F64 => quote! { #view.double_opt() },
            Scalar::F32 => quote! { #view.double_opt().map(|d| d as f32) },
            Scalar::String => quote! { #view.string_opt() },
            Scalar::Url => quote! { #view.url_opt() },
            Scalar::Date => quote! { #view.date_opt() },
        },
        TypeShape::Record(ty) => quote! { <#ty as #krate::Decode>::decode_opt(#view) },
        TypeShape::Sequence(_) | TypeShape::Keyed(_, _) => {
            let value = read_field(shape, quote! { v }, krate);
            quote! {
                {
                    let v = #view;
                    if v.is_empty() {
                        ::core::option::Option::None
                    } else {
                        ::core::option::Option::Some(#value)
                    }
                }
            }
        }
        // rejected during classification
        TypeShape::Optional(_) => quote! { ::core::option::Option::None },
    }
}
