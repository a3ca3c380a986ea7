use regex::Regex;

use crate::error::{GatekeeperError, Result};

/// How a rule pattern is applied to a candidate string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Pattern must match at the start of the string, but not necessarily consume all of it.
    Prefix,
    /// Pattern may match anywhere in the string.
    Search,
}

/// Ordered list of `(pattern, payload)` rules where the first matching rule wins.
///
/// Rules are kept in the order they were added; lookups scan them linearly and stop at the
/// first hit, so configuration order is the precedence order.
#[derive(Debug, Clone)]
pub struct RuleTable<T> {
    mode: MatchMode,
    rules: Vec<(Regex, T)>,
}

impl<T> RuleTable<T> {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            rules: Vec::new(),
        }
    }

    /// Compiles `pattern` and appends it as the lowest-precedence rule.
    ///
    /// # Errors
    ///
    /// Returns [`GatekeeperError::InvalidPattern`] if the pattern is not a valid regex.
    pub fn push(&mut self, pattern: &str, payload: T) -> Result<()> {
        let expr = match self.mode {
            MatchMode::Prefix => format!("^(?:{pattern})"),
            MatchMode::Search => pattern.to_string(),
        };
        let regex = Regex::new(&expr).map_err(|source| GatekeeperError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.rules.push((regex, payload));
        Ok(())
    }

    /// Returns the payload of the first rule matching `candidate`.
    pub fn first_match(&self, candidate: &str) -> Option<&T> {
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(candidate))
            .map(|(_, payload)| payload)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Builds a table from `(pattern, payload)` pairs, keeping their order.
    pub fn from_pairs<I, S>(mode: MatchMode, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
    {
        let mut table = Self::new(mode);
        for (pattern, payload) in pairs {
            table.push(pattern.as_ref(), payload)?;
        }
        Ok(table)
    }
}
