//! Parameter Building Module
//!
//! Validates and assembles the positional and named arguments of one bound
//! call against the call's declared parameter names. The result is an
//! ordered, purely textual mapping that feeds both the query string and the
//! response cache key.

mod value;

pub use value::ParamValue;

use crate::error::{BindError, Result};

/// Ordered parameter names used to map positional arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSchema {
    names: Vec<String>,
}

impl ParameterSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name declared at a positional index.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }
}

impl From<&[&str]> for ParameterSchema {
    fn from(names: &[&str]) -> Self {
        Self::new(names.iter().copied())
    }
}

/// Validated parameters for one call, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: Vec<(String, String)>,
}

impl ParameterSet {
    /// Build a parameter set from positional and named arguments.
    ///
    /// Positional arguments are mapped through `schema` in order and come
    /// first; named arguments follow in call order. Absent values are
    /// skipped. Fails with `TooManyParameters` when a positional index has no
    /// declared name and with `DuplicateParameter` when a named argument
    /// collides with one already present.
    pub fn build<N, K>(
        positional: &[ParamValue],
        named: N,
        schema: &ParameterSchema,
    ) -> Result<Self>
    where
        N: IntoIterator<Item = (K, ParamValue)>,
        K: Into<String>,
    {
        let mut set = Self::default();

        for (index, arg) in positional.iter().enumerate() {
            let Some(value) = arg.as_str() else {
                continue;
            };
            let name = schema
                .name_at(index)
                .ok_or(BindError::TooManyParameters {
                    supplied: positional.len(),
                    allowed: schema.len(),
                })?;
            set.entries.push((name.to_string(), value.to_string()));
        }

        for (name, arg) in named {
            let name = name.into();
            let Some(value) = arg.into_text() else {
                continue;
            };
            if set.contains(&name) {
                return Err(BindError::DuplicateParameter { name });
            }
            set.entries.push((name, value));
        }

        tracing::debug!(target: "apibind::params", params = ?set.entries, "built parameters");
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether the caller passed a pagination hint through.
    pub fn has_cursor_hint(&self) -> bool {
        self.contains("cursor") || self.contains("next")
    }

    /// URL-encode as `k1=v1&k2=v2` in insertion order.
    ///
    /// Spaces become `%20`. This text is the cache key's query part; the
    /// transport encodes the wire query itself and sends spaces as `+`.
    pub fn to_query_string(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub(crate) fn as_pairs(&self) -> &[(String, String)] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> ParameterSchema {
        ParameterSchema::from(names)
    }

    fn no_named() -> Vec<(String, ParamValue)> {
        Vec::new()
    }

    #[test]
    fn positional_arguments_follow_schema_order() {
        let set = ParameterSet::build(
            &["12".into(), 20u32.into()],
            no_named(),
            &schema(&["id", "count"]),
        )
        .unwrap();
        assert_eq!(set.get("id"), Some("12"));
        assert_eq!(set.get("count"), Some("20"));
        assert_eq!(set.to_query_string(), "id=12&count=20");
    }

    #[test]
    fn too_many_positional_arguments_fail() {
        for n in 0..4 {
            let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            let schema = ParameterSchema::new(names);
            let args: Vec<ParamValue> = (0..=n).map(|i| ParamValue::from(i as u32)).collect();
            let err = ParameterSet::build(&args, no_named(), &schema).unwrap_err();
            assert!(matches!(
                err,
                BindError::TooManyParameters { supplied, allowed } if supplied == n + 1 && allowed == n
            ));
        }
    }

    #[test]
    fn absent_positional_arguments_are_skipped() {
        let set = ParameterSet::build(
            &[ParamValue::Absent, "x".into()],
            no_named(),
            &schema(&["a", "b"]),
        )
        .unwrap();
        assert!(!set.contains("a"));
        assert_eq!(set.get("b"), Some("x"));
    }

    #[test]
    fn absent_positional_beyond_schema_is_ignored() {
        let set = ParameterSet::build(&["x".into(), ParamValue::Absent], no_named(), &schema(&["a"]))
            .unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_string_is_kept() {
        let set = ParameterSet::build(&["".into()], no_named(), &schema(&["q"])).unwrap();
        assert_eq!(set.get("q"), Some(""));
    }

    #[test]
    fn duplicate_name_fails() {
        let err = ParameterSet::build(
            &["1".into()],
            [("id", ParamValue::from(2u8))],
            &schema(&["id"]),
        )
        .unwrap_err();
        assert!(matches!(err, BindError::DuplicateParameter { name } if name == "id"));
    }

    #[test]
    fn absent_named_value_does_not_collide() {
        let set = ParameterSet::build(
            &["1".into()],
            [("id", ParamValue::Absent)],
            &schema(&["id"]),
        )
        .unwrap();
        assert_eq!(set.get("id"), Some("1"));
    }

    #[test]
    fn named_arguments_are_not_checked_against_schema() {
        let set = ParameterSet::build(
            &[],
            [("include_entities", ParamValue::from(false))],
            &schema(&[]),
        )
        .unwrap();
        assert_eq!(set.get("include_entities"), Some("false"));
    }

    #[test]
    fn query_string_is_percent_encoded() {
        let set = ParameterSet::build(&[], [("q", ParamValue::from("a b&c"))], &schema(&[])).unwrap();
        assert_eq!(set.to_query_string(), "q=a%20b%26c");
    }

    #[test]
    fn cursor_hint_detects_cursor_and_next() {
        let with_cursor =
            ParameterSet::build(&[], [("cursor", ParamValue::from(-1))], &schema(&[])).unwrap();
        let with_next =
            ParameterSet::build(&[], [("next", ParamValue::from("abc"))], &schema(&[])).unwrap();
        let plain = ParameterSet::build(&[], [("count", ParamValue::from(5))], &schema(&[])).unwrap();
        assert!(with_cursor.has_cursor_hint());
        assert!(with_next.has_cursor_hint());
        assert!(!plain.has_cursor_hint());
    }
}
