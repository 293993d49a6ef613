//! Total decoding: every type here has a value for every input.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use time::OffsetDateTime;
use url::Url;

use crate::{Document, JsonView, PathItem, Policy, trace, warning};

/// A type that can be built from any [`JsonView`], falling back to zero
/// values wherever the input is missing or has the wrong shape.
///
/// Implemented for the scalar types, `Option`, `Vec`, string-keyed maps, and
/// every [`Model`](crate::Model).
pub trait Decode: Sized {
    /// Build a value from `view`. Never fails.
    fn decode_view(view: JsonView<'_>) -> Self;

    /// Build a value, or `None` when there is nothing to decode.
    ///
    /// For containers and records "nothing" means the view [is
    /// empty](JsonView::is_empty). Scalars override this to mean "the
    /// policy could not extract a value".
    fn decode_opt(view: JsonView<'_>) -> Option<Self> {
        if view.is_empty() {
            None
        } else {
            Some(Self::decode_view(view))
        }
    }
}

macro_rules! decode_scalar {
    ($ty:ty, $plain:ident, $opt:ident) => {
        impl Decode for $ty {
            fn decode_view(view: JsonView<'_>) -> Self {
                view.$plain()
            }

            fn decode_opt(view: JsonView<'_>) -> Option<Self> {
                view.$opt()
            }
        }
    };
}

decode_scalar!(bool, bool, bool_opt);
decode_scalar!(f64, double, double_opt);
decode_scalar!(String, string, string_opt);
decode_scalar!(Url, url, url_opt);
decode_scalar!(OffsetDateTime, date, date_opt);

macro_rules! decode_signed {
    ($($ty:ty),*) => {$(
        impl Decode for $ty {
            fn decode_view(view: JsonView<'_>) -> Self {
                view.int_as()
            }

            fn decode_opt(view: JsonView<'_>) -> Option<Self> {
                view.int_as_opt()
            }
        }
    )*};
}

macro_rules! decode_unsigned {
    ($($ty:ty),*) => {$(
        impl Decode for $ty {
            fn decode_view(view: JsonView<'_>) -> Self {
                view.uint_as()
            }

            fn decode_opt(view: JsonView<'_>) -> Option<Self> {
                view.uint_as_opt()
            }
        }
    )*};
}

decode_signed!(i8, i16, i32, i64, i128, isize);
decode_unsigned!(u8, u16, u32, u64, u128, usize);

impl Decode for f32 {
    fn decode_view(view: JsonView<'_>) -> Self {
        view.double() as f32
    }

    fn decode_opt(view: JsonView<'_>) -> Option<Self> {
        view.double_opt().map(|d| d as f32)
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode_view(view: JsonView<'_>) -> Self {
        T::decode_opt(view)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode_view(view: JsonView<'_>) -> Self {
        view.elements().map(T::decode_view).collect()
    }
}

impl<T: Decode, S: BuildHasher + Default> Decode for HashMap<String, T, S> {
    fn decode_view(view: JsonView<'_>) -> Self {
        view.entries()
            .map(|(key, value)| (key.to_owned(), T::decode_view(value)))
            .collect()
    }
}

impl<T: Decode> Decode for BTreeMap<String, T> {
    fn decode_view(view: JsonView<'_>) -> Self {
        view.entries()
            .map(|(key, value)| (key.to_owned(), T::decode_view(value)))
            .collect()
    }
}

/// Decode a `T` from the root of UTF-8 JSON bytes.
///
/// Malformed input is not an error: it decodes as if the document were
/// `null`, so every field takes its zero value.
///
/// ```
/// let tags: Vec<String> = vista_core::from_slice(br#"["a", "b"]"#);
/// assert_eq!(tags, ["a", "b"]);
///
/// let nothing: Vec<String> = vista_core::from_slice(b"not json");
/// assert!(nothing.is_empty());
/// ```
pub fn from_slice<T: Decode>(bytes: &[u8]) -> T {
    from_slice_with(bytes, &[], Policy::standard())
}

/// Decode a `T` from the node at `path` inside UTF-8 JSON bytes.
pub fn from_slice_at<T: Decode>(bytes: &[u8], path: &[PathItem]) -> T {
    from_slice_with(bytes, path, Policy::standard())
}

/// Decode a `T` from the node at `path`, coercing scalars with `policy`.
pub fn from_slice_with<T: Decode>(bytes: &[u8], path: &[PathItem], policy: &Policy) -> T {
    trace!(len = bytes.len(), depth = path.len(), "decoding document");
    match Document::parse(bytes) {
        Ok(document) => T::decode_view(document.root(policy).at(path)),
        Err(err) => decode_unparsed(&err, policy),
    }
}

/// Decode a `T` from the root of JSON text.
pub fn from_str<T: Decode>(text: &str) -> T {
    from_slice(text.as_bytes())
}

/// Decode a `T` from the node at `path` inside JSON text.
pub fn from_str_at<T: Decode>(text: &str, path: &[PathItem]) -> T {
    from_slice_at(text.as_bytes(), path)
}

/// Decode a `T` from the node at `path` inside JSON text, coercing with `policy`.
pub fn from_str_with<T: Decode>(text: &str, path: &[PathItem], policy: &Policy) -> T {
    from_slice_with(text.as_bytes(), path, policy)
}

/// Decode a `T` from the node at `path` inside UTF-16 JSON text.
///
/// Unpaired surrogates count as a parse failure.
pub fn from_utf16<T: Decode>(units: &[u16], path: &[PathItem]) -> T {
    let policy = Policy::standard();
    match Document::parse_utf16(units) {
        Ok(document) => T::decode_view(document.root(policy).at(path)),
        Err(err) => decode_unparsed(&err, policy),
    }
}

/// Decode a `T` from a view the caller already holds.
pub fn from_view<T: Decode>(view: JsonView<'_>) -> T {
    T::decode_view(view)
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn decode_unparsed<T: Decode>(err: &crate::DocumentError, policy: &Policy) -> T {
    warning!(%err, "input is not valid JSON, decoding from null");
    T::decode_view(JsonView::null(policy))
}
