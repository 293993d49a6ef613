use core::fmt;

/// One step of a path into a document: an object key or an array index.
///
/// Build whole paths with the [`path!`](crate::path) macro:
///
/// ```
/// use vista_core::{PathItem, path};
///
/// let steps = path!["mastodon", "toots", 0];
/// assert_eq!(steps[1], PathItem::Key("toots".into()));
/// assert_eq!(steps[2], PathItem::Index(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathItem {
    /// Look up a member of an object.
    Key(String),
    /// Look up an element of an array. Negative indices never match.
    Index(isize),
}

impl From<&str> for PathItem {
    fn from(key: &str) -> Self {
        PathItem::Key(key.to_owned())
    }
}

impl From<String> for PathItem {
    fn from(key: String) -> Self {
        PathItem::Key(key)
    }
}

impl From<isize> for PathItem {
    fn from(index: isize) -> Self {
        PathItem::Index(index)
    }
}

impl From<i32> for PathItem {
    fn from(index: i32) -> Self {
        PathItem::Index(index as isize)
    }
}

impl From<usize> for PathItem {
    fn from(index: usize) -> Self {
        PathItem::Index(isize::try_from(index).unwrap_or(isize::MAX))
    }
}

impl fmt::Display for PathItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathItem::Key(key) => write!(f, ".{key}"),
            PathItem::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Build an array of [`PathItem`]s from keys and indices.
#[macro_export]
macro_rules! path {
    ($($item:expr),* $(,)?) => {
        [$($crate::PathItem::from($item)),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use vista_testhelpers::test;

    #[test]
    fn conversions() {
        assert_eq!(PathItem::from("a"), PathItem::Key("a".to_owned()));
        assert_eq!(PathItem::from(String::from("b")), PathItem::Key("b".to_owned()));
        assert_eq!(PathItem::from(-1), PathItem::Index(-1));
        assert_eq!(PathItem::from(3usize), PathItem::Index(3));
        assert_eq!(PathItem::from(usize::MAX), PathItem::Index(isize::MAX));
    }

    #[test]
    fn display_reads_like_an_accessor_chain() {
        let rendered: String = crate::path!["toots", 2, "id"]
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(rendered, ".toots[2].id");
    }

    #[test]
    fn empty_path() {
        let steps: [PathItem; 0] = crate::path![];
        assert!(steps.is_empty());
    }
}
