use std::collections::BTreeMap;

use serde::Serialize;
use serde_yaml::Value;

use crate::config::datatypes::Datatype;
use crate::constants::RESTART_PROPERTIES_KEY;

/// Options passed to the extraction of one datatype.
///
/// Keys are kept sorted so that plans serialize identically between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionOptions(BTreeMap<String, Value>);

impl ExtractionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Overlay `other` on top of these options, key by key
    pub fn merge_from(&mut self, other: &ExtractionOptions) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Restart properties requested for `grid`, if any
    pub fn restart_properties(&self) -> Vec<String> {
        match self.get(RESTART_PROPERTIES_KEY) {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(Value::String(single)) => vec![single.clone()],
            _ => Vec::new(),
        }
    }
}

impl FromIterator<(String, Value)> for ExtractionOptions {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Options from one configuration level (global, or one datafile).
///
/// `shared` options apply to every datatype that accepts the key;
/// `per_datatype` options were attached to one datatype explicitly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionsTable {
    pub shared: ExtractionOptions,
    pub per_datatype: BTreeMap<Datatype, ExtractionOptions>,
}

impl OptionsTable {
    pub fn is_empty(&self) -> bool {
        self.shared.is_empty() && self.per_datatype.values().all(ExtractionOptions::is_empty)
    }

    pub fn for_datatype(&self, datatype: Datatype) -> Option<&ExtractionOptions> {
        self.per_datatype.get(&datatype)
    }

    pub fn for_datatype_mut(&mut self, datatype: Datatype) -> &mut ExtractionOptions {
        self.per_datatype.entry(datatype).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[&str]) -> Value {
        Value::Sequence(items.iter().map(|s| Value::String(s.to_string())).collect())
    }

    #[test]
    fn test_merge_overrides_key_by_key() {
        let mut base = ExtractionOptions::new();
        base.insert("arrow", Value::Bool(true));
        base.insert("column_keys", Value::String("F*".into()));

        let mut overlay = ExtractionOptions::new();
        overlay.insert("column_keys", Value::String("W*".into()));

        base.merge_from(&overlay);
        assert_eq!(base.get("arrow"), Some(&Value::Bool(true)));
        assert_eq!(base.get("column_keys"), Some(&Value::String("W*".into())));
    }

    #[test]
    fn test_restart_properties() {
        let mut options = ExtractionOptions::new();
        assert!(options.restart_properties().is_empty());

        options.insert(RESTART_PROPERTIES_KEY, seq(&["SWAT", "PRESSURE"]));
        assert_eq!(options.restart_properties(), vec!["SWAT", "PRESSURE"]);

        options.insert(RESTART_PROPERTIES_KEY, Value::String("SGAS".into()));
        assert_eq!(options.restart_properties(), vec!["SGAS"]);
    }

    #[test]
    fn test_serialization_is_sorted() {
        let mut options = ExtractionOptions::new();
        options.insert("zeta", Value::Bool(true));
        options.insert("alpha", Value::Bool(false));

        let yaml = serde_yaml::to_string(&options).unwrap();
        let alpha = yaml.find("alpha").unwrap();
        let zeta = yaml.find("zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_options_table_empty() {
        let mut table = OptionsTable::default();
        assert!(table.is_empty());

        table.for_datatype_mut(Datatype::Grid);
        assert!(table.is_empty());

        table
            .for_datatype_mut(Datatype::Grid)
            .insert(RESTART_PROPERTIES_KEY, seq(&["SWAT"]));
        assert!(!table.is_empty());
        assert!(table.for_datatype(Datatype::Grid).is_some());
        assert!(table.for_datatype(Datatype::Summary).is_none());
    }
}
