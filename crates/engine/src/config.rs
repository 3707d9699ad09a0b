use std::collections::HashMap;

use serde::Deserialize;

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Built-in nickname aliases
// ---------------------------------------------------------------------------

/// Default alias → canonical pairs. `[nicknames]` entries merge over these.
const DEFAULT_NICKNAMES: &[(&str, &str)] = &[
    ("jon", "john"),
    ("johnathan", "jonathan"),
    ("pat", "patricia"),
    ("mike", "michael"),
    ("liz", "elizabeth"),
    ("beth", "elizabeth"),
    ("alex", "alexander"),
    ("sasha", "alexander"),
];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchConfig {
    #[serde(rename = "match", default)]
    pub matching: MatchSection,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default)]
    pub nicknames: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchSection {
    /// Candidates scoring below this are omitted from proposals.
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    /// When set, master records outside this category are excluded.
    #[serde(default)]
    pub category: Option<String>,
    /// Largest token count still checked for permuted-name equality.
    #[serde(default = "default_token_cap")]
    pub absolute_token_cap: usize,
}

impl Default for MatchSection {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            category: None,
            absolute_token_cap: default_token_cap(),
        }
    }
}

/// Relative weights of the similarity signals. They need not sum to 1;
/// the blend divides by the total.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightConfig {
    #[serde(default = "default_w_sequence")]
    pub sequence: f64,
    #[serde(default = "default_w_jaccard")]
    pub token_jaccard: f64,
    #[serde(default = "default_w_letters")]
    pub letters_only: f64,
    #[serde(default = "default_w_initials")]
    pub initials: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            sequence: default_w_sequence(),
            token_jaccard: default_w_jaccard(),
            letters_only: default_w_letters(),
            initials: default_w_initials(),
        }
    }
}

fn default_min_score() -> f64 {
    0.85
}

fn default_token_cap() -> usize {
    4
}

fn default_w_sequence() -> f64 {
    0.45
}

fn default_w_jaccard() -> f64 {
    0.35
}

fn default_w_letters() -> f64 {
    0.10
}

fn default_w_initials() -> f64 {
    0.10
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MatchConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: MatchConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let m = &self.matching;
        if !(0.0..=1.0).contains(&m.min_score) {
            return Err(EngineError::ConfigValidation(format!(
                "min_score must be within 0..=1, got {}",
                m.min_score
            )));
        }

        // Permutation checks are factorial in token count.
        if !(2..=8).contains(&m.absolute_token_cap) {
            return Err(EngineError::ConfigValidation(format!(
                "absolute_token_cap must be within 2..=8, got {}",
                m.absolute_token_cap
            )));
        }

        let w = &self.weights;
        for (name, value) in [
            ("sequence", w.sequence),
            ("token_jaccard", w.token_jaccard),
            ("letters_only", w.letters_only),
            ("initials", w.initials),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::ConfigValidation(format!(
                    "weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }
        if w.sequence + w.token_jaccard + w.letters_only + w.initials <= 0.0 {
            return Err(EngineError::ConfigValidation(
                "at least one weight must be positive".into(),
            ));
        }

        for (alias, canonical) in &self.nicknames {
            if alias.trim().is_empty() || canonical.trim().is_empty() {
                return Err(EngineError::ConfigValidation(
                    "nickname aliases and canonical forms must be non-empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Built-in nickname table with `[nicknames]` entries merged over it.
    /// Keys and values are lowercased so lookups happen post-normalization.
    pub fn nickname_table(&self) -> HashMap<String, String> {
        let mut table: HashMap<String, String> = DEFAULT_NICKNAMES
            .iter()
            .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
            .collect();
        for (alias, canonical) in &self.nicknames {
            table.insert(
                alias.trim().to_lowercase(),
                canonical.trim().to_lowercase(),
            );
        }
        table
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = MatchConfig::from_toml("").unwrap();
        assert_eq!(config.matching.min_score, 0.85);
        assert_eq!(config.matching.absolute_token_cap, 4);
        assert!(config.matching.category.is_none());
        assert_eq!(config.weights.sequence, 0.45);
        assert_eq!(config.weights.token_jaccard, 0.35);
        assert_eq!(config.weights.letters_only, 0.10);
        assert_eq!(config.weights.initials, 0.10);
    }

    #[test]
    fn parse_full_config() {
        let input = r#"
[match]
min_score = 0.6
category = "Member"
absolute_token_cap = 3

[weights]
sequence = 0.5
token_jaccard = 0.3
letters_only = 0.1
initials = 0.1

[nicknames]
peggy = "margaret"
"#;
        let config = MatchConfig::from_toml(input).unwrap();
        assert_eq!(config.matching.min_score, 0.6);
        assert_eq!(config.matching.category.as_deref(), Some("Member"));
        assert_eq!(config.matching.absolute_token_cap, 3);
        assert_eq!(config.weights.sequence, 0.5);
        assert_eq!(config.nicknames["peggy"], "margaret");
    }

    #[test]
    fn nickname_table_merges_over_defaults() {
        let input = r#"
[nicknames]
peggy = "margaret"
jon = "JONATHAN"
"#;
        let config = MatchConfig::from_toml(input).unwrap();
        let table = config.nickname_table();
        assert_eq!(table["peggy"], "margaret");
        // override beats the built-in alias, lowercased
        assert_eq!(table["jon"], "jonathan");
        // untouched defaults survive
        assert_eq!(table["mike"], "michael");
        assert_eq!(table["sasha"], "alexander");
    }

    #[test]
    fn reject_min_score_out_of_range() {
        let err = MatchConfig::from_toml("[match]\nmin_score = 1.2\n").unwrap_err();
        assert!(err.to_string().contains("min_score"));
    }

    #[test]
    fn reject_bad_token_cap() {
        let err = MatchConfig::from_toml("[match]\nabsolute_token_cap = 12\n").unwrap_err();
        assert!(err.to_string().contains("absolute_token_cap"));
    }

    #[test]
    fn reject_negative_weight() {
        let err = MatchConfig::from_toml("[weights]\nsequence = -0.2\n").unwrap_err();
        assert!(err.to_string().contains("sequence"));
    }

    #[test]
    fn reject_all_zero_weights() {
        let input = r#"
[weights]
sequence = 0.0
token_jaccard = 0.0
letters_only = 0.0
initials = 0.0
"#;
        let err = MatchConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("at least one weight"));
    }

    #[test]
    fn reject_empty_nickname() {
        let err = MatchConfig::from_toml("[nicknames]\n\"  \" = \"john\"\n").unwrap_err();
        assert!(err.to_string().contains("nickname"));
    }
}
