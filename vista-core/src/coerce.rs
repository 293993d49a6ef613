//! The extraction functions behind [`Policy::STANDARD`](crate::Policy::STANDARD)
//! and [`Policy::STRICT`](crate::Policy::STRICT).
//!
//! They are public so custom policies can reuse them as building blocks.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use time::OffsetDateTime;
use time::format_description::well_known::{Iso8601, Rfc3339};
use url::Url;

use crate::JsonView;

/// Relative URL references are resolved against this base; it is also the
/// zero value of URL coercion.
pub const ROOT_URL: &str = "file:///";

static ROOT: LazyLock<Url> =
    LazyLock::new(|| Url::parse(ROOT_URL).expect("ROOT_URL is a valid absolute URL"));

/// The zero URL, `file:///`, whose path is `/`.
pub fn root_url() -> Url {
    ROOT.clone()
}

/// Everything outside the union of the query-allowed and path-allowed
/// character sets plus `#`. Non-ASCII bytes are always encoded.
const URL_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Parse `text` as an absolute URL or as a reference relative to [`ROOT_URL`].
pub fn parse_url(text: &str) -> Option<Url> {
    if text.is_empty() {
        return None;
    }
    match Url::parse(text) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => ROOT.join(text).ok(),
        Err(_) => None,
    }
}

/// Like [`parse_url`], retrying once with the text percent-encoded.
///
/// The URL parser already percent-encodes paths, queries and fragments,
/// so the retry only runs for text the first parse rejects. Those failures
/// are in the scheme, host or port. Hosts are percent-decoded before
/// validation, so the retry yields the same `None` for them.
pub fn parse_url_lenient(text: &str) -> Option<Url> {
    parse_url(text).or_else(|| {
        let encoded = utf8_percent_encode(text, URL_ENCODE_SET).to_string();
        parse_url(&encoded)
    })
}

/// An instant `seconds` after the Unix epoch, sub-second part kept to the
/// nanosecond. Non-finite or out-of-range inputs fail.
pub fn instant_from_seconds(seconds: f64) -> Option<OffsetDateTime> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.trunc();
    let nanos = ((seconds - whole) * 1e9).round();
    if whole.abs() >= i64::MAX as f64 {
        return None;
    }
    let total = i128::from(whole as i64) * 1_000_000_000 + nanos as i128;
    OffsetDateTime::from_unix_timestamp_nanos(total).ok()
}

/// Parse RFC 3339 text (fractional seconds optional), then fall back to the
/// broader ISO 8601 grammar.
pub fn parse_iso8601(text: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(text, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(text, &Iso8601::DEFAULT))
        .ok()
}

fn seconds_from_number(view: JsonView<'_>) -> Option<OffsetDateTime> {
    if let Some(seconds) = view.raw_int() {
        return OffsetDateTime::from_unix_timestamp(seconds).ok();
    }
    instant_from_seconds(view.raw_number()?)
}

fn seconds_from_text(text: &str) -> Option<OffsetDateTime> {
    if let Ok(seconds) = text.parse::<i64>() {
        return OffsetDateTime::from_unix_timestamp(seconds).ok();
    }
    instant_from_seconds(text.parse::<f64>().ok()?)
}

fn nonzero(view: JsonView<'_>) -> Option<bool> {
    view.raw_int()
        .map(|i| i != 0)
        .or_else(|| view.raw_uint().map(|u| u != 0))
}

/// Compatible extraction: native values first, then cross-type fallbacks.
pub mod standard {
    use super::*;

    /// Native boolean; else a native integer, true when nonzero.
    pub fn boolean(view: JsonView<'_>) -> Option<bool> {
        view.raw_bool().or_else(|| nonzero(view))
    }

    /// Native integer; else a string that is entirely a base-10 integer.
    pub fn integer(view: JsonView<'_>) -> Option<i64> {
        view.raw_int()
            .or_else(|| view.raw_str()?.parse().ok())
    }

    /// Native non-negative integer; else a string holding one.
    pub fn unsigned(view: JsonView<'_>) -> Option<u64> {
        view.raw_uint()
            .or_else(|| view.raw_str()?.parse().ok())
    }

    /// Any native number; else a string holding a float.
    pub fn double(view: JsonView<'_>) -> Option<f64> {
        view.raw_number()
            .or_else(|| view.raw_str()?.parse().ok())
    }

    /// Native string; else the decimal rendering of a native integer.
    pub fn string(view: JsonView<'_>) -> Option<String> {
        if let Some(text) = view.raw_str() {
            return Some(text.to_owned());
        }
        match view.node()? {
            serde_json::Value::Number(n) if !n.is_f64() => Some(n.to_string()),
            _ => None,
        }
    }

    /// Native string parsed as a URL, retried percent-encoded.
    pub fn url(view: JsonView<'_>) -> Option<Url> {
        parse_url_lenient(view.raw_str()?)
    }

    /// Seconds since the epoch from a number or numeric string; else ISO 8601 text.
    pub fn date(view: JsonView<'_>) -> Option<OffsetDateTime> {
        if view.is_number() {
            return seconds_from_number(view);
        }
        let text = view.raw_str()?;
        seconds_from_text(text).or_else(|| parse_iso8601(text))
    }
}

/// Strict extraction: only the native JSON type is accepted.
pub mod strict {
    use super::*;

    /// Native boolean only.
    pub fn boolean(view: JsonView<'_>) -> Option<bool> {
        view.raw_bool()
    }

    /// Native integer only.
    pub fn integer(view: JsonView<'_>) -> Option<i64> {
        view.raw_int()
    }

    /// Native non-negative integer only.
    pub fn unsigned(view: JsonView<'_>) -> Option<u64> {
        view.raw_uint()
    }

    /// Native number only.
    pub fn double(view: JsonView<'_>) -> Option<f64> {
        view.raw_number()
    }

    /// Native string only.
    pub fn string(view: JsonView<'_>) -> Option<String> {
        view.raw_str().map(str::to_owned)
    }

    /// Native string parsed as a URL, no encoding retry.
    pub fn url(view: JsonView<'_>) -> Option<Url> {
        parse_url(view.raw_str()?)
    }

    /// Native number as seconds since the epoch, or an RFC 3339 string.
    pub fn date(view: JsonView<'_>) -> Option<OffsetDateTime> {
        if view.is_number() {
            return seconds_from_number(view);
        }
        OffsetDateTime::parse(view.raw_str()?, &Rfc3339).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Document, Policy};
    use vista_testhelpers::test;

    fn with_doc(text: &str, check: impl FnOnce(JsonView<'_>)) {
        let doc = Document::parse_str(text).unwrap();
        check(doc.view());
    }

    #[test]
    fn bool_chain() {
        with_doc(
            r#"{"a": true, "b": false, "c": 0, "d": 1, "e": -1, "f": 100,
                "g": "true", "h": "", "i": 1.5}"#,
            |v| {
                assert!(v.member("a").bool());
                assert!(!v.member("b").bool());
                assert!(!v.member("c").bool());
                assert!(v.member("d").bool());
                assert!(v.member("e").bool());
                assert!(v.member("f").bool());
                assert_eq!(v.member("g").bool_opt(), None);
                assert_eq!(v.member("h").bool_opt(), None);
                assert_eq!(v.member("i").bool_opt(), None);
            },
        );
    }

    #[test]
    fn int_chain() {
        with_doc(
            r#"{"a": -1, "b": "-1", "c": "0", "d": "", "e": "1.2", "f": 4.5,
                "g": true, "h": "88888888888888888", "i": " 1"}"#,
            |v| {
                assert_eq!(v.member("a").int(), -1);
                assert_eq!(v.member("b").int(), -1);
                assert_eq!(v.member("c").int_opt(), Some(0));
                assert_eq!(v.member("d").int_opt(), None);
                assert_eq!(v.member("e").int_opt(), None);
                assert_eq!(v.member("f").int_opt(), None);
                assert_eq!(v.member("g").int_opt(), None);
                assert_eq!(v.member("g").int(), 0);
                assert_eq!(v.member("h").int(), 88_888_888_888_888_888);
                assert_eq!(v.member("i").int_opt(), None);
            },
        );
    }

    #[test]
    fn uint_chain() {
        with_doc(r#"{"a": 5, "b": -5, "c": "18446744073709551615", "d": "-1"}"#, |v| {
            assert_eq!(v.member("a").uint(), 5);
            assert_eq!(v.member("b").uint_opt(), None);
            assert_eq!(v.member("c").uint(), u64::MAX);
            assert_eq!(v.member("d").uint_opt(), None);
        });
    }

    #[test]
    fn double_chain() {
        with_doc(
            r#"{"a": -1.0, "b": 5, "c": "2", "d": "-1.5", "e": "", "f": true}"#,
            |v| {
                assert_eq!(v.member("a").double(), -1.0);
                assert_eq!(v.member("b").double(), 5.0);
                assert_eq!(v.member("c").double_opt(), Some(2.0));
                assert_eq!(v.member("d").double(), -1.5);
                assert_eq!(v.member("e").double_opt(), None);
                assert_eq!(v.member("f").double_opt(), None);
            },
        );
    }

    #[test]
    fn string_chain() {
        with_doc(
            r#"{"a": -1.0, "b": -1, "c": 0, "d": true, "e": "", "f": "joke"}"#,
            |v| {
                assert_eq!(v.member("a").string(), "");
                assert_eq!(v.member("b").string(), "-1");
                assert_eq!(v.member("c").string(), "0");
                assert_eq!(v.member("d").string_opt(), None);
                assert_eq!(v.member("e").string_opt().as_deref(), Some(""));
                assert_eq!(v.member("f").string(), "joke");
            },
        );
    }

    #[test]
    fn date_from_numbers_and_strings() {
        with_doc(
            r#"{"n": 1234567890, "s": "1234567890", "neg": -1, "f": 1.5,
                "iso": "2012-04-23T18:25:43.511Z", "iso_whole": "2012-04-23T18:25:43Z",
                "b": true, "junk": "yesterday"}"#,
            |v| {
                let number = v.member("n").date();
                assert_eq!(number.unix_timestamp(), 1_234_567_890);
                assert_eq!(v.member("s").date(), number);
                assert_eq!(v.member("neg").date().unix_timestamp(), -1);
                assert_eq!(v.member("f").date().unix_timestamp_nanos(), 1_500_000_000);

                let iso = v.member("iso").date();
                assert_eq!(iso.unix_timestamp_nanos(), 1_335_205_543_511_000_000);
                assert_eq!(v.member("iso_whole").date().unix_timestamp(), 1_335_205_543);

                assert_eq!(v.member("b").date_opt(), None);
                assert_eq!(v.member("b").date(), OffsetDateTime::UNIX_EPOCH);
                assert_eq!(v.member("junk").date_opt(), None);
            },
        );
    }

    #[test]
    fn fractional_numeric_string_matches_number() {
        with_doc(r#"{"n": 1335050743.1, "s": "1335050743.1"}"#, |v| {
            let number = v.member("n").date().unix_timestamp_nanos();
            let text = v.member("s").date().unix_timestamp_nanos();
            assert!((number - text).abs() < 1_000);
            assert_eq!(v.member("s").date().unix_timestamp(), 1_335_050_743);
        });
    }

    #[test]
    fn url_chain() {
        with_doc(
            r#"{"num": 1, "b": true, "empty": "", "dot": ".",
                "abs": "https://github.com/vista-rs", "juice": "apple juice",
                "wiki": "https://zh.wikipedia.org/wiki/围棋"}"#,
            |v| {
                assert_eq!(v.member("num").url_opt(), None);
                assert_eq!(v.member("b").url_opt(), None);
                assert_eq!(v.member("empty").url_opt(), None);
                assert_eq!(v.member("dot").url_opt().map(|u| u.path().to_owned()).as_deref(), Some("/"));
                assert_eq!(
                    v.member("abs").url().as_str(),
                    "https://github.com/vista-rs"
                );
                let juice = v.member("juice").url();
                assert_eq!(juice.path(), "/apple%20juice");
                assert_eq!(
                    v.member("wiki").url().as_str(),
                    "https://zh.wikipedia.org/wiki/%E5%9B%B4%E6%A3%8B"
                );
                assert_eq!(v.member("missing").url().path(), "/");
            },
        );
    }

    #[test]
    fn parser_encodes_everything_but_the_host() {
        let encoded = parse_url("https://a.b/c d?e=f g#h i").unwrap();
        assert_eq!(encoded.as_str(), "https://a.b/c%20d?e=f%20g#h%20i");
        for text in ["apple juice", "https://a.b/c?d=e f", "relative/path", "mailto:x@y.z"] {
            assert_eq!(parse_url_lenient(text), parse_url(text), "{text}");
        }
    }

    #[test]
    fn retry_cannot_rescue_a_bad_host() {
        for text in ["http://[oops", "http://exa mple.com/", "http://a^b.com/", "http://a.b:8 0/"] {
            assert_eq!(parse_url(text), None, "{text}");
            assert_eq!(parse_url_lenient(text), None, "{text}");
        }
        assert_eq!(parse_url(""), None);
        assert_eq!(parse_url_lenient(""), None);
    }

    #[test]
    fn strict_has_no_fallbacks() {
        let doc = Document::parse_str(
            r#"{"i": 1, "s": "1", "d": "1234567890", "n": 1234567890,
                "iso": "2012-04-23T18:25:43Z"}"#,
        )
        .unwrap();
        let v = doc.root(Policy::strict());
        assert_eq!(v.member("i").bool_opt(), None);
        assert_eq!(v.member("s").int_opt(), None);
        assert_eq!(v.member("s").uint_opt(), None);
        assert_eq!(v.member("s").double_opt(), None);
        assert_eq!(v.member("i").string_opt(), None);
        assert_eq!(v.member("d").date_opt(), None);
        assert_eq!(v.member("n").date().unix_timestamp(), 1_234_567_890);
        assert_eq!(v.member("iso").date().unix_timestamp(), 1_335_205_543);
    }

    #[test]
    fn seconds_conversion_rejects_garbage() {
        assert_eq!(instant_from_seconds(f64::NAN), None);
        assert_eq!(instant_from_seconds(f64::INFINITY), None);
        assert_eq!(instant_from_seconds(1e300), None);
        assert_eq!(
            instant_from_seconds(-0.5).map(|t| t.unix_timestamp_nanos()),
            Some(-500_000_000)
        );
    }
}
