//! In-memory snapshot of the persisted section/option store
//!
//! A thin adapter over the TOML parser that fixes the document shape to two
//! levels: named sections holding `option = value` lines. Section names are
//! kept verbatim; option names are normalized to lower-case on every access,
//! the classic ini-store rule.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use toml::Value;

use crate::error::ConfigError;

/// Parsed contents of a config file at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSnapshot {
    sections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ConfigSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the file at `path`.
    ///
    /// A missing file is not an error and yields an empty snapshot; any other
    /// I/O failure or a malformed document propagates. Option names in the
    /// document are normalized, so hand-edited mixed-case keys still resolve.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let snapshot: Self = toml::from_str(&contents)?;
        Ok(snapshot.normalized())
    }

    /// Lower-case every option key, keeping the last value on collisions.
    fn normalized(self) -> Self {
        let sections = self
            .sections
            .into_iter()
            .map(|(name, options)| {
                let options = options.into_iter().map(|(k, v)| (normalize(&k), v)).collect();
                (name, options)
            })
            .collect();
        Self { sections }
    }

    /// Look up an option.
    ///
    /// Scalar values are returned in their string form regardless of how they
    /// were spelled in the file (`port = 8080` reads back as `"8080"`).
    /// Arrays and nested tables are treated as absent.
    pub fn get(&self, section: &str, option: &str) -> Option<String> {
        self.sections.get(section)?.get(&normalize(option)).and_then(value_to_string)
    }

    /// Set an option to a string value, creating the section if needed.
    pub fn set(&mut self, section: &str, option: &str, value: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(normalize(option), Value::String(value.to_string()));
    }

    /// True if the section holds the option.
    pub fn has_option(&self, section: &str, option: &str) -> bool {
        self.sections
            .get(section)
            .is_some_and(|options| options.contains_key(&normalize(option)))
    }

    /// True if the section exists.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Ensure the section exists. Returns whether it was created; asking for
    /// an existing section is a no-op, not an error.
    pub fn add_section(&mut self, section: &str) -> bool {
        if self.sections.contains_key(section) {
            return false;
        }
        self.sections.insert(section.to_string(), BTreeMap::new());
        true
    }

    /// Remove an option. Returns whether it was present. A section left with
    /// no options is dropped from the snapshot.
    pub fn remove_option(&mut self, section: &str, option: &str) -> bool {
        let Some(options) = self.sections.get_mut(section) else {
            return false;
        };
        let removed = options.remove(&normalize(option)).is_some();
        if removed && options.is_empty() {
            self.sections.remove(section);
        }
        removed
    }

    /// Section names in the snapshot.
    pub fn sections(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    /// Option names in a section, empty if the section does not exist.
    pub fn options(&self, section: &str) -> Vec<String> {
        self.sections
            .get(section)
            .map(|options| options.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Render to the persisted text form.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn normalize(option: &str) -> String {
    option.to_lowercase()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let snapshot = ConfigSnapshot::read(&temp.path().join("config")).unwrap();
        assert!(snapshot.sections().is_empty());
    }

    #[test]
    fn test_read_malformed_file_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        fs::write(&path, "this is not valid {{{").unwrap();

        let result = ConfigSnapshot::read(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_set_and_get() {
        let mut snapshot = ConfigSnapshot::new();
        snapshot.set("core", "output", "json");

        assert_eq!(snapshot.get("core", "output"), Some("json".to_string()));
        assert_eq!(snapshot.get("core", "missing"), None);
        assert_eq!(snapshot.get("missing", "output"), None);
    }

    #[test]
    fn test_option_names_are_case_insensitive() {
        let mut snapshot = ConfigSnapshot::new();
        snapshot.set("core", "Output", "json");

        assert_eq!(snapshot.get("core", "OUTPUT"), Some("json".to_string()));
        assert!(snapshot.has_option("core", "output"));
        assert_eq!(snapshot.options("core"), vec!["output".to_string()]);
    }

    #[test]
    fn test_section_names_are_case_sensitive() {
        let mut snapshot = ConfigSnapshot::new();
        snapshot.set("Core", "output", "json");

        assert_eq!(snapshot.get("core", "output"), None);
        assert!(snapshot.has_section("Core"));
        assert!(!snapshot.has_section("core"));
    }

    #[test]
    fn test_set_twice_keeps_latest_value_only() {
        let mut snapshot = ConfigSnapshot::new();
        snapshot.set("core", "output", "text");
        snapshot.set("core", "output", "json");

        assert_eq!(snapshot.get("core", "output"), Some("json".to_string()));
        assert_eq!(snapshot.options("core").len(), 1);
    }

    #[test]
    fn test_add_section_is_idempotent() {
        let mut snapshot = ConfigSnapshot::new();
        assert!(snapshot.add_section("core"));
        assert!(!snapshot.add_section("core"));
        assert!(snapshot.has_section("core"));
    }

    #[test]
    fn test_remove_option_prunes_empty_section() {
        let mut snapshot = ConfigSnapshot::new();
        snapshot.set("core", "output", "json");
        snapshot.set("core", "color", "auto");

        assert!(snapshot.remove_option("core", "output"));
        assert!(snapshot.has_section("core"));

        assert!(snapshot.remove_option("core", "color"));
        assert!(!snapshot.has_section("core"));

        assert!(!snapshot.remove_option("core", "color"));
        assert!(!snapshot.remove_option("missing", "color"));
    }

    #[test]
    fn test_round_trip_preserves_sections_and_options() {
        let mut snapshot = ConfigSnapshot::new();
        snapshot.set("core", "output", "json");
        snapshot.set("core", "no_color", "true");
        snapshot.set("cloud", "name", "AzureCloud");
        snapshot.add_section("empty");

        let rendered = snapshot.to_toml_string().unwrap();
        let parsed: ConfigSnapshot = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_hand_written_scalars_read_as_strings() {
        let parsed: ConfigSnapshot = toml::from_str(
            r#"
[defaults]
port = 8080
ratio = 0.5
enabled = true
name = "local"
"#,
        )
        .unwrap();

        assert_eq!(parsed.get("defaults", "port"), Some("8080".to_string()));
        assert_eq!(parsed.get("defaults", "ratio"), Some("0.5".to_string()));
        assert_eq!(parsed.get("defaults", "enabled"), Some("true".to_string()));
        assert_eq!(parsed.get("defaults", "name"), Some("local".to_string()));
    }

    #[test]
    fn test_non_scalar_values_are_absent() {
        let parsed: ConfigSnapshot = toml::from_str(
            r#"
[defaults]
hosts = ["a", "b"]
"#,
        )
        .unwrap();

        assert_eq!(parsed.get("defaults", "hosts"), None);
        // Present in the document, still enumerable
        assert!(parsed.has_option("defaults", "hosts"));
    }

    #[test]
    fn test_read_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        fs::write(&path, "[core]\noutput = \"json\"\n# a comment\n").unwrap();

        let snapshot = ConfigSnapshot::read(&path).unwrap();
        assert_eq!(snapshot.get("core", "output"), Some("json".to_string()));
    }

    #[test]
    fn test_read_normalizes_hand_written_option_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config");
        fs::write(&path, "[defaults]\nPort = 8080\n").unwrap();

        let snapshot = ConfigSnapshot::read(&path).unwrap();
        assert_eq!(snapshot.get("defaults", "port"), Some("8080".to_string()));
        assert_eq!(snapshot.options("defaults"), vec!["port".to_string()]);
    }
}
