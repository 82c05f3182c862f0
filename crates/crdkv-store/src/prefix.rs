//! "/"-segmented prefix scans over a flat key map.

use serde::{Deserialize, Serialize};

/// The prefix that lists every key, unstripped.
pub const ROOT: &str = "/";

/// A key and its value as returned by reads.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The part of `key` below `prefix`, if `key` is nested under it.
///
/// `key` must be longer than `prefix`, start with it, and continue with a
/// `/` right after it: `/foo/bar` is under `/foo`, `/foobar` and `/foo`
/// itself are not.
pub fn strip<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(prefix)?;
    rest.strip_prefix('/')
}

/// Select the entries listed under `prefix`.
///
/// Listing [`ROOT`] returns every entry with its full key. Any other prefix
/// returns nested entries with `prefix/` removed from their keys. Output
/// order follows the input.
pub fn scan<I>(entries: I, prefix: &str) -> Vec<KeyValue>
where
    I: IntoIterator<Item = (String, String)>,
{
    if prefix == ROOT {
        return entries
            .into_iter()
            .map(|(key, value)| KeyValue { key, value })
            .collect();
    }

    entries
        .into_iter()
        .filter_map(|(key, value)| strip(&key, prefix).map(|rest| KeyValue::new(rest, value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sorted(mut list: Vec<KeyValue>) -> Vec<KeyValue> {
        list.sort();
        list
    }

    #[test]
    fn boundary_must_be_a_slash() {
        let data = entries(&[("/foo", "a"), ("/foo/bar", "b"), ("/foobar", "c")]);
        assert_eq!(scan(data, "/foo"), vec![KeyValue::new("bar", "b")]);
    }

    #[test]
    fn root_lists_everything_unstripped() {
        let data = entries(&[("/foo", "a"), ("/foo/bar", "b"), ("plain", "c")]);
        assert_eq!(
            sorted(scan(data, "/")),
            vec![
                KeyValue::new("/foo", "a"),
                KeyValue::new("/foo/bar", "b"),
                KeyValue::new("plain", "c"),
            ]
        );
    }

    #[test]
    fn nested_levels_keep_their_remainder() {
        let data = entries(&[("/a/b/c", "1"), ("/a/b", "2"), ("/a/bc", "3")]);
        assert_eq!(
            sorted(scan(data, "/a")),
            vec![KeyValue::new("b", "2"), KeyValue::new("b/c", "1")]
        );
    }

    #[test]
    fn trailing_slash_key_lists_as_empty_remainder() {
        let data = entries(&[("/foo/", "x")]);
        assert_eq!(scan(data, "/foo"), vec![KeyValue::new("", "x")]);
    }

    #[test]
    fn strip_examples() {
        assert_eq!(strip("/foo/bar", "/foo"), Some("bar"));
        assert_eq!(strip("/foo", "/foo"), None);
        assert_eq!(strip("/foobar", "/foo"), None);
        assert_eq!(strip("/fo", "/foo"), None);
        assert_eq!(strip("/föö/x", "/föö"), Some("x"));
    }

    proptest! {
        #[test]
        fn scan_matches_definition(
            keys in proptest::collection::hash_set("(/[a-c]{0,2}){1,3}", 0..12),
            prefix in "(/[a-c]{0,2}){1,2}",
        ) {
            prop_assume!(prefix != ROOT);
            let data: Vec<(String, String)> =
                keys.iter().map(|k| (k.clone(), format!("v{k}"))).collect();
            let listed = sorted(scan(data, &prefix));

            let mut expected: Vec<KeyValue> = keys
                .iter()
                .filter(|k| {
                    k.len() > prefix.len()
                        && k.starts_with(prefix.as_str())
                        && k.as_bytes()[prefix.len()] == b'/'
                })
                .map(|k| KeyValue::new(&k[prefix.len() + 1..], format!("v{k}")))
                .collect();
            expected.sort();

            prop_assert_eq!(listed, expected);
        }

        #[test]
        fn root_scan_is_identity(
            keys in proptest::collection::hash_set("(/[a-c]{0,2}){1,3}", 0..12),
        ) {
            let data: Vec<(String, String)> =
                keys.iter().map(|k| (k.clone(), String::new())).collect();
            prop_assert_eq!(scan(data, ROOT).len(), keys.len());
        }
    }
}
