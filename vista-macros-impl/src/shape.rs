//! Classification of field types into the shapes the derive knows how to read.

use proc_macro2::{Delimiter, Ident, Span, TokenStream, TokenTree};
use quote::ToTokens;

use crate::ModelError;
use crate::grammar::split_top_level_commas;

/// `Vec` and map levels may nest this deep. `Option` wraps a level
/// without counting as one, so `Option<Vec<HashMap<String, Vec<T>>>>` is
/// accepted.
pub const MAX_CONTAINER_DEPTH: usize = 3;

/// A scalar read through one of the view's coercion accessors.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `bool`
    Bool,
    /// A signed integer type, narrowed from `i64`
    Int(Ident),
    /// An unsigned integer type, narrowed from `u64`
    UInt(Ident),
    /// `f64`
    F64,
    /// `f32`, cast from the coerced `f64`
    F32,
    /// `String`
    String,
    /// `Url`
    Url,
    /// `OffsetDateTime`
    Date,
}

/// How a field type is read.
#[derive(Debug, Clone)]
pub enum TypeShape {
    /// A scalar.
    Scalar(Scalar),
    /// `Option<T>`.
    Optional(Box<TypeShape>),
    /// `Vec<T>`.
    Sequence(Box<TypeShape>),
    /// `HashMap<String, T>` or `BTreeMap<String, T>`; the tokens are the map type.
    Keyed(TokenStream, Box<TypeShape>),
    /// Anything else, decoded through its own `Decode` implementation.
    Record(TokenStream),
}

impl TypeShape {
    /// Classify `ty`.
    pub fn classify(ty: &TokenStream) -> Result<Self, ModelError> {
        classify(ty, 0)
    }

    /// `true` for `Option<_>`.
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeShape::Optional(_))
    }
}

fn span_of(ty: &TokenStream) -> Span {
    ty.clone()
        .into_iter()
        .next()
        .map_or_else(Span::call_site, |tt| tt.span())
}

/// A path type split into its final segment and that segment's generic arguments.
struct PathType {
    last: Ident,
    args: Vec<TokenStream>,
}

fn path_type(ty: &TokenStream) -> Result<PathType, ModelError> {
    let span = span_of(ty);
    let tokens: Vec<TokenTree> = ty.clone().into_iter().collect();

    match tokens.first() {
        None => return Err(ModelError::new("missing field type", span)),
        Some(TokenTree::Punct(p)) if p.as_char() == '&' => {
            return Err(ModelError::new(
                "references cannot be decoded; use an owned type such as `String`",
                span,
            ));
        }
        Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Parenthesis => {
            return Err(ModelError::new(
                "tuples cannot be decoded; use a `Vec` or a nested model",
                span,
            ));
        }
        Some(TokenTree::Group(g)) if g.delimiter() == Delimiter::Bracket => {
            return Err(ModelError::new(
                "arrays and slices cannot be decoded; use a `Vec`",
                span,
            ));
        }
        Some(TokenTree::Ident(i)) if i == "dyn" || i == "impl" || i == "fn" => {
            return Err(ModelError::new(
                format!("`{i}` types cannot be decoded"),
                span,
            ));
        }
        _ => {}
    }

    // walk `a::b::C<...>`, remembering the last identifier and where its
    // generic arguments start
    let mut last = None;
    let mut args_start = None;
    for (index, tt) in tokens.iter().enumerate() {
        match tt {
            TokenTree::Ident(ident) => last = Some(ident.clone()),
            TokenTree::Punct(p) if p.as_char() == ':' => {}
            TokenTree::Punct(p) if p.as_char() == '<' => {
                args_start = Some(index);
                break;
            }
            _ => {
                return Err(ModelError::new(
                    "unsupported field type; expected a path such as `Vec<String>`",
                    tt.span(),
                ));
            }
        }
    }
    let last = last.ok_or_else(|| ModelError::new("expected a type name", span))?;

    let args = match args_start {
        None => Vec::new(),
        Some(start) => {
            let inner = &tokens[start + 1..];
            match inner.last() {
                Some(TokenTree::Punct(p)) if p.as_char() == '>' => {}
                _ => {
                    return Err(ModelError::new(
                        "unsupported field type; expected a path such as `Vec<String>`",
                        span,
                    ));
                }
            }
            let inner: TokenStream = inner[..inner.len() - 1].iter().cloned().collect();
            split_top_level_commas(inner)
        }
    };

    Ok(PathType { last, args })
}

fn single_arg(path: &PathType, what: &str) -> Result<TokenStream, ModelError> {
    match path.args.as_slice() {
        [arg] => Ok(arg.clone()),
        _ => Err(ModelError::new(
            format!("`{what}` expects exactly one type argument"),
            path.last.span(),
        )),
    }
}

fn classify(ty: &TokenStream, depth: usize) -> Result<TypeShape, ModelError> {
    let path = path_type(ty)?;
    let name = path.last.to_string();

    let scalar = match name.as_str() {
        "bool" => Some(Scalar::Bool),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" => Some(Scalar::Int(path.last.clone())),
        "u8" | "u16" | "u32" | "u64" | "u128" | "usize" => Some(Scalar::UInt(path.last.clone())),
        "f64" => Some(Scalar::F64),
        "f32" => Some(Scalar::F32),
        "String" => Some(Scalar::String),
        "Url" => Some(Scalar::Url),
        "OffsetDateTime" => Some(Scalar::Date),
        _ => None,
    };
    if let Some(scalar) = scalar {
        if !path.args.is_empty() {
            return Err(ModelError::new(
                format!("`{name}` takes no type arguments"),
                path.last.span(),
            ));
        }
        return Ok(TypeShape::Scalar(scalar));
    }

    let container_depth = depth + 1;
    let too_deep = || {
        ModelError::new(
            format!("containers nest at most {MAX_CONTAINER_DEPTH} levels deep"),
            path.last.span(),
        )
    };

    match name.as_str() {
        "Option" => {
            let inner = classify(&single_arg(&path, "Option")?, depth)?;
            if inner.is_optional() {
                return Err(ModelError::new(
                    "`Option<Option<_>>` cannot be decoded; absence already maps to `None`",
                    path.last.span(),
                ));
            }
            Ok(TypeShape::Optional(Box::new(inner)))
        }
        "Vec" => {
            if container_depth > MAX_CONTAINER_DEPTH {
                return Err(too_deep());
            }
            let inner = classify(&single_arg(&path, "Vec")?, container_depth)?;
            Ok(TypeShape::Sequence(Box::new(inner)))
        }
        "HashMap" | "BTreeMap" => {
            if container_depth > MAX_CONTAINER_DEPTH {
                return Err(too_deep());
            }
            let (key, value) = match path.args.as_slice() {
                [key, value] => (key, value),
                [key, value, _hasher] if name == "HashMap" => (key, value),
                _ => {
                    return Err(ModelError::new(
                        format!("`{name}` expects a key and a value type"),
                        path.last.span(),
                    ));
                }
            };
            match path_type(key) {
                Ok(key) if key.last == "String" && key.args.is_empty() => {}
                _ => {
                    return Err(ModelError::new(
                        "map keys must be `String`",
                        span_of(key),
                    ));
                }
            }
            let inner = classify(value, container_depth)?;
            Ok(TypeShape::Keyed(ty.clone(), Box::new(inner)))
        }
        _ => Ok(TypeShape::Record(ty.to_token_stream())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn shape(ty: TokenStream) -> TypeShape {
        TypeShape::classify(&ty).unwrap()
    }

    fn error(ty: TokenStream) -> String {
        TypeShape::classify(&ty).unwrap_err().message
    }

    #[test]
    fn scalars() {
        assert!(matches!(shape(quote!(bool)), TypeShape::Scalar(Scalar::Bool)));
        assert!(matches!(shape(quote!(u16)), TypeShape::Scalar(Scalar::UInt(_))));
        assert!(matches!(shape(quote!(i32)), TypeShape::Scalar(Scalar::Int(_))));
        assert!(matches!(shape(quote!(f32)), TypeShape::Scalar(Scalar::F32)));
        assert!(matches!(
            shape(quote!(std::string::String)),
            TypeShape::Scalar(Scalar::String)
        ));
        assert!(matches!(shape(quote!(::url::Url)), TypeShape::Scalar(Scalar::Url)));
        assert!(matches!(
            shape(quote!(time::OffsetDateTime)),
            TypeShape::Scalar(Scalar::Date)
        ));
    }

    #[test]
    fn containers() {
        let TypeShape::Optional(inner) = shape(quote!(Option<Vec<HashMap<String, i64>>>)) else {
            panic!("expected an optional");
        };
        let TypeShape::Sequence(inner) = *inner else {
            panic!("expected a sequence");
        };
        let TypeShape::Keyed(map, value) = *inner else {
            panic!("expected a map");
        };
        assert_eq!(map.to_string(), quote!(HashMap<String, i64>).to_string());
        assert!(matches!(*value, TypeShape::Scalar(Scalar::Int(_))));

        assert!(matches!(
            shape(quote!(BTreeMap<String, Account>)),
            TypeShape::Keyed(_, _)
        ));
        assert!(matches!(
            shape(quote!(HashMap<String, bool, RandomState>)),
            TypeShape::Keyed(_, _)
        ));
    }

    #[test]
    fn options_do_not_count_toward_depth() {
        let TypeShape::Optional(inner) = shape(quote!(Option<Vec<HashMap<String, Vec<i64>>>>))
        else {
            panic!("expected an optional");
        };
        let TypeShape::Sequence(inner) = *inner else {
            panic!("expected a sequence");
        };
        let TypeShape::Keyed(_, inner) = *inner else {
            panic!("expected a map");
        };
        assert!(matches!(*inner, TypeShape::Sequence(_)));

        assert!(matches!(
            shape(quote!(Vec<Option<Vec<Option<Vec<i64>>>>>)),
            TypeShape::Sequence(_)
        ));
        assert!(matches!(
            shape(quote!(HashMap<String, Vec<Account>>)),
            TypeShape::Keyed(_, _)
        ));
    }

    #[test]
    fn records() {
        let TypeShape::Record(ty) = shape(quote!(crate::models::Account)) else {
            panic!("expected a record");
        };
        assert_eq!(ty.to_string(), quote!(crate::models::Account).to_string());
        assert!(matches!(shape(quote!(Wrapper<i64>)), TypeShape::Record(_)));
    }

    #[test]
    fn unsupported_types() {
        assert_eq!(
            error(quote!(&'a str)),
            "references cannot be decoded; use an owned type such as `String`"
        );
        assert_eq!(
            error(quote!((i64, i64))),
            "tuples cannot be decoded; use a `Vec` or a nested model"
        );
        assert_eq!(
            error(quote!([u8; 4])),
            "arrays and slices cannot be decoded; use a `Vec`"
        );
        assert_eq!(
            error(quote!(Option<Option<i64>>)),
            "`Option<Option<_>>` cannot be decoded; absence already maps to `None`"
        );
        assert_eq!(error(quote!(HashMap<u32, i64>)), "map keys must be `String`");
        assert_eq!(
            error(quote!(Vec<Vec<Vec<Vec<i64>>>>)),
            "containers nest at most 3 levels deep"
        );
        assert_eq!(
            error(quote!(Option<Vec<Option<HashMap<String, Vec<Vec<i64>>>>>>)),
            "containers nest at most 3 levels deep"
        );
        assert_eq!(error(quote!(Vec<i64, i64>)), "`Vec` expects exactly one type argument");
        assert_eq!(error(quote!(dyn Fn())), "`dyn` types cannot be decoded");
    }
}
