use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Test-selection configuration.
///
/// Describes which tests always run, how changed paths map to features and which tests each
/// feature pulls in. Missing or empty top-level keys default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestSelectionConfig {
    /// Test names required regardless of the change
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_tests: Vec<String>,

    /// Test name regexps required regardless of the change
    #[serde(default, deserialize_with = "null_as_default")]
    pub required_regexps: Vec<String>,

    /// Ordered path rules; the first pattern matching a changed path wins
    #[serde(default, deserialize_with = "deserialize_path_rules")]
    pub paths: Vec<PathRule>,

    /// Feature name to the tests it requires, in document order
    #[serde(default, deserialize_with = "null_as_default")]
    pub mapping: IndexMap<String, Option<FeatureTests>>,
}

/// One `pattern: [features]` entry of the `paths` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRule {
    pub pattern: String,
    pub features: Vec<String>,
}

/// Tests enabled by a single feature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FeatureTests {
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: Vec<String>,

    /// A single test-name regexp
    #[serde(default)]
    pub regexps: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `paths` is a list of single-key maps so that rule order survives every config format.
fn deserialize_path_rules<'de, D>(deserializer: D) -> std::result::Result<Vec<PathRule>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<IndexMap<String, Option<Vec<String>>>> = null_as_default(deserializer)?;

    Ok(entries
        .into_iter()
        .flatten()
        .map(|(pattern, features)| PathRule {
            pattern,
            features: features.unwrap_or_default(),
        })
        .collect())
}

impl TestSelectionConfig {
    /// Load configuration from a specific file path.
    ///
    /// The format is picked from the extension (`yaml`/`yml`, `toml`, `json`); anything
    /// else is tried as YAML, then TOML, then JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            _ => serde_yaml::from_str(&contents)
                .or_else(|_| toml::from_str(&contents))
                .or_else(|_| serde_json::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
