use std::collections::BTreeSet;
use std::io::{self, Write};

use indexmap::IndexMap;
use log::debug;

use crate::config::{FeatureTests, TestSelectionConfig};
use crate::error::Result;
use crate::rules::{MatchMode, RuleTable};

/// Tests and test-name regexps required for a change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequiredTests {
    pub names: BTreeSet<String>,
    pub regexps: BTreeSet<String>,
}

impl RequiredTests {
    /// Writes names joined by `;` on one line and regexps joined by `|` on the next.
    pub fn emit(&self, out: &mut impl Write) -> io::Result<()> {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        let regexps: Vec<&str> = self.regexps.iter().map(String::as_str).collect();
        writeln!(out, "{}", names.join(";"))?;
        writeln!(out, "{}", regexps.join("|"))
    }
}

/// Maps changed paths to features and features to the tests that must run.
#[derive(Debug)]
pub struct TestSelector {
    required_tests: Vec<String>,
    required_regexps: Vec<String>,
    path_rules: RuleTable<Vec<String>>,
    mapping: IndexMap<String, FeatureTests>,
}

impl TestSelector {
    /// Compiles the path rules of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a path pattern is not a valid regex.
    pub fn new(config: TestSelectionConfig) -> Result<Self> {
        let path_rules = RuleTable::from_pairs(
            MatchMode::Search,
            config
                .paths
                .into_iter()
                .map(|rule| (rule.pattern, rule.features)),
        )?;

        let mapping = config
            .mapping
            .into_iter()
            .map(|(feature, tests)| (feature, tests.unwrap_or_default()))
            .collect();

        Ok(Self {
            required_tests: config.required_tests,
            required_regexps: config.required_regexps,
            path_rules,
            mapping,
        })
    }

    /// Every feature known to the mapping, in configuration order.
    pub fn all_features(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys().map(String::as_str)
    }

    /// Features that need testing for the given changed paths.
    ///
    /// Each path contributes the features of the first rule it matches. A path matching no
    /// rule at all can't be classified, so every known feature is returned straight away. A
    /// rule with an empty feature list still counts as a match.
    pub fn features_for_change<S: AsRef<str>>(&self, changed_paths: &[S]) -> BTreeSet<String> {
        let mut enabled = BTreeSet::new();
        for path in changed_paths {
            let path = path.as_ref();
            let Some(features) = self.path_rules.first_match(path) else {
                debug!("'{path}' matches no path rule, enabling all features");
                return self.all_features().map(ToString::to_string).collect();
            };
            debug!("'{path}' enables {features:?}");
            enabled.extend(features.iter().cloned());
        }
        enabled
    }

    /// Always-required tests plus those pulled in by each enabled feature.
    ///
    /// Features missing from the mapping add nothing.
    pub fn select_required_tests(&self, enabled_features: &BTreeSet<String>) -> RequiredTests {
        let mut required = RequiredTests {
            names: self.required_tests.iter().cloned().collect(),
            regexps: self.required_regexps.iter().cloned().collect(),
        };

        for tests in enabled_features
            .iter()
            .filter_map(|feature| self.mapping.get(feature))
        {
            required.names.extend(tests.names.iter().cloned());
            if let Some(regexp) = &tests.regexps {
                required.regexps.insert(regexp.clone());
            }
        }
        required
    }

    /// `(feature, skip)` for every known feature, in configuration order.
    pub fn skip_statuses(&self, enabled_features: &BTreeSet<String>) -> Vec<(String, bool)> {
        self.all_features()
            .map(|feature| (feature.to_string(), !enabled_features.contains(feature)))
            .collect()
    }

    /// Writes `skip_<feature>=yes|no` for every known feature.
    pub fn emit_skip_report(
        &self,
        enabled_features: &BTreeSet<String>,
        out: &mut impl Write,
    ) -> io::Result<()> {
        for (feature, skip) in self.skip_statuses(enabled_features) {
            writeln!(out, "skip_{feature}={}", if skip { "yes" } else { "no" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathRule;

    fn rule(pattern: &str, features: &[&str]) -> PathRule {
        PathRule {
            pattern: pattern.to_string(),
            features: features.iter().map(ToString::to_string).collect(),
        }
    }

    fn tests(names: &[&str], regexps: Option<&str>) -> Option<FeatureTests> {
        Some(FeatureTests {
            names: names.iter().map(ToString::to_string).collect(),
            regexps: regexps.map(ToString::to_string),
        })
    }

    fn selector() -> TestSelector {
        let config = TestSelectionConfig {
            required_tests: vec!["build-checks".to_string()],
            required_regexps: vec!["^static-checks".to_string()],
            paths: vec![
                rule("^docs/", &["docs"]),
                rule("\\.md$", &[]),
                rule("^src/runtime/", &["runtime", "kernel"]),
                rule("^src/", &["agent"]),
            ],
            mapping: [
                ("docs".to_string(), tests(&["docs-lint"], None)),
                ("runtime".to_string(), tests(&["runtime-unit"], Some("runtime-.*"))),
                ("kernel".to_string(), None),
                ("agent".to_string(), tests(&["agent-unit", "runtime-unit"], Some("agent-.*"))),
            ]
            .into_iter()
            .collect(),
        };
        TestSelector::new(config).unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_docs_change_enables_docs_only() {
        let selector = selector();
        assert_eq!(selector.features_for_change(&["docs/readme.md"]), set(&["docs"]));
    }

    #[test]
    fn test_unmatched_path_enables_everything() {
        let selector = selector();
        assert_eq!(
            selector.features_for_change(&["docs/readme.md", "tools/osbuilder/build.sh"]),
            set(&["docs", "runtime", "kernel", "agent"])
        );
        assert_eq!(
            selector.features_for_change(&["src/main.go"]),
            set(&["agent"])
        );
    }

    #[test]
    fn test_empty_change_enables_nothing() {
        let selector = selector();
        let changed: Vec<String> = Vec::new();
        assert!(selector.features_for_change(&changed).is_empty());
    }

    #[test]
    fn test_rule_order_decides_features() {
        let selector = selector();
        // Matches both "^src/runtime/" and "^src/"; only the first contributes.
        assert_eq!(
            selector.features_for_change(&["src/runtime/virtcontainers/qemu.go"]),
            set(&["runtime", "kernel"])
        );
    }

    #[test]
    fn test_match_with_empty_features_is_not_unmatched() {
        let selector = selector();
        assert!(selector.features_for_change(&["CHANGELOG.md"]).is_empty());
        assert_eq!(
            selector.features_for_change(&["CHANGELOG.md", "docs/install.md"]),
            set(&["docs"])
        );
    }

    #[test]
    fn test_required_tests_without_features() {
        let selector = selector();
        let required = selector.select_required_tests(&BTreeSet::new());

        assert_eq!(required.names, set(&["build-checks"]));
        assert_eq!(required.regexps, set(&["^static-checks"]));
    }

    #[test]
    fn test_required_tests_union_feature_tests() {
        let selector = selector();
        let enabled = set(&["runtime", "agent", "kernel", "unknown"]);
        let required = selector.select_required_tests(&enabled);

        assert_eq!(
            required.names,
            set(&["agent-unit", "build-checks", "runtime-unit"])
        );
        assert_eq!(
            required.regexps,
            set(&["^static-checks", "agent-.*", "runtime-.*"])
        );
    }

    #[test]
    fn test_emit_required_tests_wire_format() {
        let required = RequiredTests {
            names: set(&["a", "b"]),
            regexps: set(&["x-.*", "y"]),
        };
        let mut out = Vec::new();
        required.emit(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "a;b\nx-.*|y\n");
    }

    #[test]
    fn test_emit_required_tests_empty_sets() {
        let mut out = Vec::new();
        RequiredTests::default().emit(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n\n");
    }

    #[test]
    fn test_emit_skip_report() {
        let selector = selector();
        let enabled = selector.features_for_change(&["docs/index.md", "src/runtime/Makefile"]);

        let mut out = Vec::new();
        selector.emit_skip_report(&enabled, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "skip_docs=no\nskip_runtime=no\nskip_kernel=no\nskip_agent=yes\n"
        );
    }

    #[test]
    fn test_invalid_path_pattern_is_rejected() {
        let config = TestSelectionConfig {
            paths: vec![rule("[docs", &["docs"])],
            ..TestSelectionConfig::default()
        };
        assert!(TestSelector::new(config).is_err());
    }
}
