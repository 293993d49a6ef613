//! Navigation and value queries over a borrowed node.

use core::fmt;
use std::collections::HashMap;

use serde_json::Value;
use time::OffsetDateTime;
use url::Url;

use crate::coerce;
use crate::{PathItem, Policy};

/// A cheap, copyable handle over one node of a [`Document`](crate::Document)
/// together with the [`Policy`] used to coerce it.
///
/// A view never owns data: it borrows the node (if any) and the policy.
/// A missing node and a JSON `null` behave identically, so navigation on a
/// partially missing path keeps returning null views instead of failing:
///
/// ```
/// use vista_core::Document;
///
/// let doc = Document::parse_str(r#"{"user": {"tags": ["a", "b"]}}"#).unwrap();
/// let view = doc.view();
/// assert_eq!(view.member("user").member("tags").index(1).string(), "b");
/// assert!(view.member("nope").index(3).member("x").is_null());
/// ```
#[derive(Clone, Copy)]
pub struct JsonView<'a> {
    node: Option<&'a Value>,
    policy: &'a Policy,
}

impl<'a> JsonView<'a> {
    /// A view over `node`.
    pub const fn new(node: Option<&'a Value>, policy: &'a Policy) -> Self {
        Self { node, policy }
    }

    /// A view over nothing. Every query on it answers null, empty or zero.
    pub const fn null(policy: &'a Policy) -> Self {
        Self { node: None, policy }
    }

    /// The underlying node, or `None` when the view is null.
    pub fn node(self) -> Option<&'a Value> {
        self.node.filter(|value| !value.is_null())
    }

    /// The policy this view coerces with.
    pub fn policy(self) -> &'a Policy {
        self.policy
    }

    /// The same node, coerced with another policy.
    pub fn with_policy<'b>(self, policy: &'b Policy) -> JsonView<'b>
    where
        'a: 'b,
    {
        JsonView {
            node: self.node,
            policy,
        }
    }

    // === Navigation ===

    /// The value stored under `key`, or a null view.
    pub fn member(self, key: &str) -> Self {
        let node = self.node.and_then(Value::as_object).and_then(|o| o.get(key));
        Self { node, ..self }
    }

    /// The array element at `index`, or a null view when out of bounds.
    pub fn index(self, index: isize) -> Self {
        let node = usize::try_from(index)
            .ok()
            .and_then(|i| self.node.and_then(Value::as_array)?.get(i));
        Self { node, ..self }
    }

    /// Walk `path` one key or index at a time.
    pub fn at(self, path: &[PathItem]) -> Self {
        path.iter().fold(self, |view, item| match item {
            PathItem::Key(key) => view.member(key),
            PathItem::Index(index) => view.index(*index),
        })
    }

    // === Structural queries ===

    /// `true` for a missing node or a JSON `null`.
    pub fn is_null(self) -> bool {
        self.node.is_none_or(Value::is_null)
    }

    /// `true` if the node is an object.
    pub fn is_object(self) -> bool {
        matches!(self.node, Some(Value::Object(_)))
    }

    /// `true` if the node is an array.
    pub fn is_array(self) -> bool {
        matches!(self.node, Some(Value::Array(_)))
    }

    /// `true` if the node is `true` or `false`.
    pub fn is_bool(self) -> bool {
        matches!(self.node, Some(Value::Bool(_)))
    }

    /// `true` if the node is an integer-typed number, signed or unsigned.
    pub fn is_int(self) -> bool {
        matches!(self.node, Some(Value::Number(n)) if !n.is_f64())
    }

    /// `true` if the node is a real-typed number (`1.0`, `1e3`).
    pub fn is_double(self) -> bool {
        matches!(self.node, Some(Value::Number(n)) if n.is_f64())
    }

    /// `true` if the node is any number.
    pub fn is_number(self) -> bool {
        matches!(self.node, Some(Value::Number(_)))
    }

    /// `true` if the node is a string.
    pub fn is_string(self) -> bool {
        matches!(self.node, Some(Value::String(_)))
    }

    /// `true` for null views, `{}` and `[]`. Populated scalars are never empty.
    pub fn is_empty(self) -> bool {
        match self.node {
            None | Some(Value::Null) => true,
            Some(Value::Object(object)) => object.is_empty(),
            Some(Value::Array(array)) => array.is_empty(),
            Some(_) => false,
        }
    }

    /// Number of object entries or array elements; `0` for anything else.
    pub fn len(self) -> usize {
        match self.node {
            Some(Value::Object(object)) => object.len(),
            Some(Value::Array(array)) => array.len(),
            _ => 0,
        }
    }

    // === Raw accessors (exact native type, no coercion) ===

    /// The native boolean.
    pub fn raw_bool(self) -> Option<bool> {
        self.node?.as_bool()
    }

    /// The native integer, if it fits in `i64`.
    pub fn raw_int(self) -> Option<i64> {
        self.node?.as_i64()
    }

    /// The native non-negative integer.
    pub fn raw_uint(self) -> Option<u64> {
        self.node?.as_u64()
    }

    /// The native real number. Integer-typed numbers are rejected.
    pub fn raw_double(self) -> Option<f64> {
        match self.node? {
            Value::Number(n) if n.is_f64() => n.as_f64(),
            _ => None,
        }
    }

    /// Any native number, integers promoted to `f64`.
    pub fn raw_number(self) -> Option<f64> {
        self.node?.as_f64()
    }

    /// The native string, borrowed from the document.
    pub fn raw_str(self) -> Option<&'a str> {
        self.node?.as_str()
    }

    // === Containers ===

    /// Lazily iterate over object entries. Non-objects yield nothing.
    pub fn entries(self) -> impl Iterator<Item = (&'a str, JsonView<'a>)> {
        let policy = self.policy;
        self.node
            .and_then(Value::as_object)
            .into_iter()
            .flatten()
            .map(move |(key, value)| (key.as_str(), JsonView::new(Some(value), policy)))
    }

    /// Lazily iterate over array elements. Non-arrays yield nothing.
    pub fn elements(self) -> impl Iterator<Item = JsonView<'a>> {
        let policy = self.policy;
        self.node
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(move |value| JsonView::new(Some(value), policy))
    }

    /// Object entries keyed by their (borrowed) names.
    pub fn keyed(self) -> HashMap<&'a str, JsonView<'a>> {
        self.entries().collect()
    }

    /// Array elements in order.
    pub fn sequence(self) -> Vec<JsonView<'a>> {
        self.elements().collect()
    }

    /// Like [`keyed`](Self::keyed), but `None` when the view [is empty](Self::is_empty).
    pub fn keyed_opt(self) -> Option<HashMap<&'a str, JsonView<'a>>> {
        (!self.is_empty()).then(|| self.keyed())
    }

    /// Like [`sequence`](Self::sequence), but `None` when the view [is empty](Self::is_empty).
    pub fn sequence_opt(self) -> Option<Vec<JsonView<'a>>> {
        (!self.is_empty()).then(|| self.sequence())
    }

    // === Policy-driven coercions ===

    /// Coerce to a boolean with the view's policy.
    pub fn bool_opt(self) -> Option<bool> {
        (self.policy.bool)(self)
    }

    /// Coerce to a boolean, `false` on failure.
    pub fn bool(self) -> bool {
        self.bool_opt().unwrap_or(false)
    }

    /// Coerce to a boolean with a caller-supplied function.
    pub fn bool_with(self, extract: impl FnOnce(Self) -> Option<bool>) -> Option<bool> {
        extract(self)
    }

    /// Coerce to a signed integer with the view's policy.
    pub fn int_opt(self) -> Option<i64> {
        (self.policy.int)(self)
    }

    /// Coerce to a signed integer, `0` on failure.
    pub fn int(self) -> i64 {
        self.int_opt().unwrap_or(0)
    }

    /// Coerce to a signed integer with a caller-supplied function.
    pub fn int_with(self, extract: impl FnOnce(Self) -> Option<i64>) -> Option<i64> {
        extract(self)
    }

    /// Coerce to a signed integer and narrow it to `T`; out-of-range values fail.
    pub fn int_as_opt<T: TryFrom<i64>>(self) -> Option<T> {
        self.int_opt().and_then(|i| T::try_from(i).ok())
    }

    /// Like [`int_as_opt`](Self::int_as_opt), zero on failure.
    pub fn int_as<T: TryFrom<i64> + Default>(self) -> T {
        self.int_as_opt().unwrap_or_default()
    }

    /// Coerce to an unsigned integer with the view's policy.
    pub fn uint_opt(self) -> Option<u64> {
        (self.policy.uint)(self)
    }

    /// Coerce to an unsigned integer, `0` on failure.
    pub fn uint(self) -> u64 {
        self.uint_opt().unwrap_or(0)
    }

    /// Coerce to an unsigned integer with a caller-supplied function.
    pub fn uint_with(self, extract: impl FnOnce(Self) -> Option<u64>) -> Option<u64> {
        extract(self)
    }

    /// Coerce to an unsigned integer and narrow it to `T`; out-of-range values fail.
    pub fn uint_as_opt<T: TryFrom<u64>>(self) -> Option<T> {
        self.uint_opt().and_then(|u| T::try_from(u).ok())
    }

    /// Like [`uint_as_opt`](Self::uint_as_opt), zero on failure.
    pub fn uint_as<T: TryFrom<u64> + Default>(self) -> T {
        self.uint_as_opt().unwrap_or_default()
    }

    /// Coerce to a double with the view's policy.
    pub fn double_opt(self) -> Option<f64> {
        (self.policy.double)(self)
    }

    /// Coerce to a double, `0.0` on failure.
    pub fn double(self) -> f64 {
        self.double_opt().unwrap_or(0.0)
    }

    /// Coerce to a double with a caller-supplied function.
    pub fn double_with(self, extract: impl FnOnce(Self) -> Option<f64>) -> Option<f64> {
        extract(self)
    }

    /// Coerce to a string with the view's policy.
    pub fn string_opt(self) -> Option<String> {
        (self.policy.string)(self)
    }

    /// Coerce to a string, `""` on failure.
    pub fn string(self) -> String {
        self.string_opt().unwrap_or_default()
    }

    /// Coerce to a string with a caller-supplied function.
    pub fn string_with(self, extract: impl FnOnce(Self) -> Option<String>) -> Option<String> {
        extract(self)
    }

    /// Coerce to a URL with the view's policy.
    pub fn url_opt(self) -> Option<Url> {
        (self.policy.url)(self)
    }

    /// Coerce to a URL, the root URL on failure.
    pub fn url(self) -> Url {
        self.url_opt().unwrap_or_else(coerce::root_url)
    }

    /// Coerce to a URL with a caller-supplied function.
    pub fn url_with(self, extract: impl FnOnce(Self) -> Option<Url>) -> Option<Url> {
        extract(self)
    }

    /// Coerce to an instant with the view's policy.
    pub fn date_opt(self) -> Option<OffsetDateTime> {
        (self.policy.date)(self)
    }

    /// Coerce to an instant, the Unix epoch on failure.
    pub fn date(self) -> OffsetDateTime {
        self.date_opt().unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }

    /// Coerce to an instant with a caller-supplied function.
    pub fn date_with(
        self,
        extract: impl FnOnce(Self) -> Option<OffsetDateTime>,
    ) -> Option<OffsetDateTime> {
        extract(self)
    }
}

impl fmt::Debug for JsonView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonView")
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}
