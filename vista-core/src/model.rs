use crate::{Decode, JsonView, PathItem, Policy, decode};

/// A record type that decodes itself from a [`JsonView`].
///
/// Usually implemented with `#[derive(Model)]`, which reads each field
/// from the member of the same name (or the name given with
/// `#[model(key = "...")]`) using the rule that matches the field's type.
/// Hand-written implementations are fine too:
///
/// ```
/// use vista_core::{Decode, JsonView, Model, decode_record};
///
/// struct Point {
///     x: i64,
///     y: i64,
/// }
///
/// impl Model for Point {
///     fn from_view(view: JsonView<'_>) -> Self {
///         Point {
///             x: view.member("x").int(),
///             y: view.member("y").int(),
///         }
///     }
/// }
///
/// impl Decode for Point {
///     fn decode_view(view: JsonView<'_>) -> Self {
///         decode_record(view)
///     }
/// }
///
/// let p = Point::decode(br#"{"x": 3, "y": "4"}"#);
/// assert_eq!((p.x, p.y), (3, 4));
/// ```
pub trait Model: Decode {
    /// The coercion policy for this record's own fields.
    ///
    /// `None` inherits whatever policy the enclosing decode is using.
    const POLICY: Option<&'static Policy> = None;

    /// Build the record from `view`, which already carries the effective policy.
    fn from_view(view: JsonView<'_>) -> Self;

    /// Decode the record from the root of UTF-8 JSON bytes.
    fn decode(bytes: &[u8]) -> Self {
        decode::from_slice(bytes)
    }

    /// Decode the record from the root of JSON text.
    fn decode_str(text: &str) -> Self {
        decode::from_str(text)
    }

    /// Decode the record from the node at `path` inside UTF-8 JSON bytes.
    fn decode_at(bytes: &[u8], path: &[PathItem]) -> Self {
        decode::from_slice_at(bytes, path)
    }
}

/// Decode a record, switching to its own [`Model::POLICY`] when it has one.
pub fn decode_record<M: Model>(view: JsonView<'_>) -> M {
    match M::POLICY {
        Some(policy) => M::from_view(view.with_policy(policy)),
        None => M::from_view(view),
    }
}
