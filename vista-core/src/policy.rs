use core::fmt;

use time::OffsetDateTime;
use url::Url;

use crate::JsonView;
use crate::coerce::{standard, strict};

/// A pure extraction function: read a `T` out of a view, or give up.
pub type Extract<T> = for<'a> fn(JsonView<'a>) -> Option<T>;

/// The set of functions a [`JsonView`] uses to coerce nodes into scalars.
///
/// Policies are plain function pointers, so they are `Copy`, carry no state,
/// and can be stored in `static` or `const` items and shared across threads.
/// Individual functions are replaced with the `with_*` builders:
///
/// ```
/// use vista_core::{JsonView, Policy};
///
/// fn yes_no(view: JsonView<'_>) -> Option<bool> {
///     match view.raw_str()? {
///         "yes" => Some(true),
///         "no" => Some(false),
///         _ => Policy::STANDARD.extract_bool(view),
///     }
/// }
///
/// static LENIENT: Policy = Policy::STANDARD.with_bool(yes_no);
/// ```
#[derive(Clone, Copy)]
pub struct Policy {
    pub(crate) bool: Extract<bool>,
    pub(crate) int: Extract<i64>,
    pub(crate) uint: Extract<u64>,
    pub(crate) double: Extract<f64>,
    pub(crate) string: Extract<String>,
    pub(crate) url: Extract<Url>,
    pub(crate) date: Extract<OffsetDateTime>,
}

impl Policy {
    /// The compatible policy: native values first, then the cross-type
    /// fallbacks documented in [`coerce::standard`](crate::coerce::standard).
    pub const STANDARD: Policy = Policy {
        bool: standard::boolean,
        int: standard::integer,
        uint: standard::unsigned,
        double: standard::double,
        string: standard::string,
        url: standard::url,
        date: standard::date,
    };

    /// Native JSON types only; see [`coerce::strict`](crate::coerce::strict).
    pub const STRICT: Policy = Policy {
        bool: strict::boolean,
        int: strict::integer,
        uint: strict::unsigned,
        double: strict::double,
        string: strict::string,
        url: strict::url,
        date: strict::date,
    };

    /// A `'static` reference to [`Policy::STANDARD`].
    pub const fn standard() -> &'static Policy {
        &Self::STANDARD
    }

    /// A `'static` reference to [`Policy::STRICT`].
    pub const fn strict() -> &'static Policy {
        &Self::STRICT
    }

    /// Replace the boolean extractor.
    pub const fn with_bool(mut self, extract: Extract<bool>) -> Self {
        self.bool = extract;
        self
    }

    /// Replace the signed integer extractor.
    pub const fn with_int(mut self, extract: Extract<i64>) -> Self {
        self.int = extract;
        self
    }

    /// Replace the unsigned integer extractor.
    pub const fn with_uint(mut self, extract: Extract<u64>) -> Self {
        self.uint = extract;
        self
    }

    /// Replace the double extractor.
    pub const fn with_double(mut self, extract: Extract<f64>) -> Self {
        self.double = extract;
        self
    }

    /// Replace the string extractor.
    pub const fn with_string(mut self, extract: Extract<String>) -> Self {
        self.string = extract;
        self
    }

    /// Replace the URL extractor.
    pub const fn with_url(mut self, extract: Extract<Url>) -> Self {
        self.url = extract;
        self
    }

    /// Replace the date extractor.
    pub const fn with_date(mut self, extract: Extract<OffsetDateTime>) -> Self {
        self.date = extract;
        self
    }

    /// Run this policy's boolean extractor, ignoring the view's own policy.
    ///
    /// Handy inside a custom extractor that wants to fall back to a preset.
    pub fn extract_bool(&self, view: JsonView<'_>) -> Option<bool> {
        (self.bool)(view)
    }

    /// Run this policy's signed integer extractor.
    pub fn extract_int(&self, view: JsonView<'_>) -> Option<i64> {
        (self.int)(view)
    }

    /// Run this policy's unsigned integer extractor.
    pub fn extract_uint(&self, view: JsonView<'_>) -> Option<u64> {
        (self.uint)(view)
    }

    /// Run this policy's double extractor.
    pub fn extract_double(&self, view: JsonView<'_>) -> Option<f64> {
        (self.double)(view)
    }

    /// Run this policy's string extractor.
    pub fn extract_string(&self, view: JsonView<'_>) -> Option<String> {
        (self.string)(view)
    }

    /// Run this policy's URL extractor.
    pub fn extract_url(&self, view: JsonView<'_>) -> Option<Url> {
        (self.url)(view)
    }

    /// Run this policy's date extractor.
    pub fn extract_date(&self, view: JsonView<'_>) -> Option<OffsetDateTime> {
        (self.date)(view)
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use vista_testhelpers::test;

    fn yes_is_true(view: JsonView<'_>) -> Option<bool> {
        match view.raw_str() {
            Some(text) => Some(text == "yes"),
            None => Policy::STANDARD.extract_bool(view),
        }
    }

    static YES_POLICY: Policy = Policy::STANDARD.with_bool(yes_is_true);

    #[test]
    fn policies_are_shareable() {
        fn assert_send_sync<T: Send + Sync + Copy + 'static>() {}
        assert_send_sync::<Policy>();
    }

    #[test]
    fn functional_update_replaces_one_function() {
        let doc = Document::parse_str(r#"{"a": "yes", "b": 1, "c": "42"}"#).unwrap();
        let view = doc.root(&YES_POLICY);
        assert_eq!(view.member("a").bool_opt(), Some(true));
        assert_eq!(view.member("b").bool_opt(), Some(true));
        // untouched extractors keep the standard behavior
        assert_eq!(view.member("c").int_opt(), Some(42));

        let standard = doc.view();
        assert_eq!(standard.member("a").bool_opt(), None);
    }

    #[test]
    fn strict_versus_compatible() {
        let doc = Document::parse_str(r#"{"a": 1, "n": "42"}"#).unwrap();
        let compatible = doc.view();
        let strict = doc.root(Policy::strict());

        assert_eq!(compatible.member("a").bool_opt(), Some(true));
        assert!(compatible.member("a").bool());
        assert_eq!(strict.member("a").bool_opt(), None);
        assert!(!strict.member("a").bool());

        assert_eq!(compatible.member("n").int(), 42);
        assert_eq!(strict.member("n").int(), 0);
    }

    #[test]
    fn swapping_policy_on_a_view() {
        let doc = Document::parse_str(r#"{"n": "7"}"#).unwrap();
        let view = doc.view().member("n");
        assert_eq!(view.int_opt(), Some(7));
        assert_eq!(view.with_policy(Policy::strict()).int_opt(), None);
        assert_eq!(view.with_policy(&Policy::default()).int_opt(), Some(7));
    }
}
