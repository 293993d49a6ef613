//! The `#[model(...)]` attribute on containers and fields.

use proc_macro2::{Literal, Span, TokenStream, TokenTree};

use crate::ModelError;
use crate::grammar::{Attribute, split_top_level_commas};

/// One `name` or `name = value` item inside `#[model(...)]`.
struct AttrArg {
    name: String,
    span: Span,
    value: Option<TokenStream>,
}

fn parse_args(args: TokenStream) -> Result<Vec<AttrArg>, ModelError> {
    split_top_level_commas(args)
        .into_iter()
        .map(|piece| {
            let mut tokens = piece.into_iter();
            let (name, span) = match tokens.next() {
                Some(TokenTree::Ident(ident)) => (ident.to_string(), ident.span()),
                Some(other) => {
                    return Err(ModelError::new(
                        "expected an attribute name",
                        other.span(),
                    ));
                }
                None => {
                    return Err(ModelError::new(
                        "expected an attribute name",
                        Span::call_site(),
                    ));
                }
            };
            let value = match tokens.next() {
                None => None,
                Some(TokenTree::Punct(eq)) if eq.as_char() == '=' => {
                    let value: TokenStream = tokens.collect();
                    if value.is_empty() {
                        return Err(ModelError::new(
                            format!("expected a value after `{name} =`"),
                            eq.span(),
                        ));
                    }
                    Some(value)
                }
                Some(other) => {
                    return Err(ModelError::new(
                        format!("expected `=` or `,` after `{name}`"),
                        other.span(),
                    ));
                }
            };
            Ok(AttrArg { name, span, value })
        })
        .collect()
}

/// Every `#[model(...)]` item across `attributes`, in order.
fn model_args(attributes: &[Attribute]) -> Result<Vec<AttrArg>, ModelError> {
    let mut args = Vec::new();
    for attribute in attributes {
        if attribute.is_malformed_model() {
            return Err(ModelError::new(
                "expected `#[model(...)]`",
                attribute.body.0.span(),
            ));
        }
        if let Some(tokens) = attribute.model_args() {
            args.extend(parse_args(tokens)?);
        }
    }
    Ok(args)
}

fn reject_duplicate(seen: bool, arg: &AttrArg) -> Result<(), ModelError> {
    if seen {
        Err(ModelError::new(
            format!("duplicate `{}` attribute", arg.name),
            arg.span,
        ))
    } else {
        Ok(())
    }
}

fn require_value(arg: AttrArg) -> Result<TokenStream, ModelError> {
    arg.value.ok_or_else(|| {
        ModelError::new(format!("`{}` needs a value: `{} = ...`", arg.name, arg.name), arg.span)
    })
}

fn reject_value(arg: &AttrArg) -> Result<(), ModelError> {
    match &arg.value {
        Some(_) => Err(ModelError::new(
            format!("`{}` takes no value", arg.name),
            arg.span,
        )),
        None => Ok(()),
    }
}

/// Attributes on the struct itself.
#[derive(Default)]
pub struct ContainerAttrs {
    /// `#[model(policy = PATH)]`: the policy for this record's fields
    pub policy: Option<TokenStream>,
    /// `#[model(crate = path)]`: where the `vista` items live
    pub krate: Option<TokenStream>,
}

impl ContainerAttrs {
    /// Collect container attributes.
    pub fn parse(attributes: &[Attribute]) -> Result<Self, ModelError> {
        let mut attrs = ContainerAttrs::default();
        for arg in model_args(attributes)? {
            match arg.name.as_str() {
                "policy" => {
                    reject_duplicate(attrs.policy.is_some(), &arg)?;
                    attrs.policy = Some(require_value(arg)?);
                }
                "crate" => {
                    reject_duplicate(attrs.krate.is_some(), &arg)?;
                    attrs.krate = Some(require_value(arg)?);
                }
                "key" | "ignored" | "flatten" => {
                    return Err(ModelError::new(
                        format!("`{}` belongs on a field, not on the struct", arg.name),
                        arg.span,
                    ));
                }
                other => {
                    return Err(ModelError::new(
                        format!("unknown model attribute `{other}`"),
                        arg.span,
                    ));
                }
            }
        }
        Ok(attrs)
    }
}

/// Attributes on one field.
#[derive(Default)]
pub struct FieldAttrs {
    /// `#[model(key = "...")]`: the member to read instead of the field name
    pub key: Option<Literal>,
    /// `#[model(ignored)]`: not read from JSON, always `Default::default()`
    pub ignored: bool,
    /// `#[model(flatten)]`: decoded from the enclosing object itself
    pub flatten: bool,
}

impl FieldAttrs {
    /// Collect field attributes.
    pub fn parse(attributes: &[Attribute]) -> Result<Self, ModelError> {
        let mut attrs = FieldAttrs::default();
        let mut first_span = None;
        for arg in model_args(attributes)? {
            first_span.get_or_insert(arg.span);
            match arg.name.as_str() {
                "key" => {
                    reject_duplicate(attrs.key.is_some(), &arg)?;
                    let span = arg.span;
                    attrs.key = Some(string_literal(require_value(arg)?, span)?);
                }
                "ignored" => {
                    reject_duplicate(attrs.ignored, &arg)?;
                    reject_value(&arg)?;
                    attrs.ignored = true;
                }
                "flatten" => {
                    reject_duplicate(attrs.flatten, &arg)?;
                    reject_value(&arg)?;
                    attrs.flatten = true;
                }
                "policy" | "crate" => {
                    return Err(ModelError::new(
                        format!("`{}` belongs on the struct, not on a field", arg.name),
                        arg.span,
                    ));
                }
                other => {
                    return Err(ModelError::new(
                        format!("unknown model attribute `{other}`"),
                        arg.span,
                    ));
                }
            }
        }

        let span = first_span.unwrap_or_else(Span::call_site);
        let exclusive = [attrs.key.is_some(), attrs.ignored, attrs.flatten];
        if exclusive.iter().filter(|set| **set).count() > 1 {
            return Err(ModelError::new(
                "`key`, `ignored` and `flatten` cannot be combined",
                span,
            ));
        }
        Ok(attrs)
    }
}

/// The value of `key = ...` must be a single plain string literal.
fn string_literal(value: TokenStream, span: Span) -> Result<Literal, ModelError> {
    let mut tokens = value.into_iter();
    match (tokens.next(), tokens.next()) {
        (Some(TokenTree::Literal(lit)), None) => {
            let text = lit.to_string();
            if text.starts_with('"') || text.starts_with("r\"") || text.starts_with("r#") {
                Ok(lit)
            } else {
                Err(ModelError::new("`key` must be a string literal", lit.span()))
            }
        }
        _ => Err(ModelError::new("`key` must be a string literal", span)),
    }
}
