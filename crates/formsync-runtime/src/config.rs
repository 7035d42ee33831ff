//! Form configuration

use formsync_core::{FormError, FormResult};
use formsync_state::{LookupRule, RuleSet};
use serde::{Deserialize, Serialize};

/// Data restored by `Form::reset`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetTarget {
    /// The snapshot the form was constructed with
    #[default]
    Construction,
    /// The most recently reconciled snapshot
    Latest,
}

/// Form configuration
#[derive(Clone, Debug)]
pub struct FormConfig {
    /// Dependency rule table
    pub rules: RuleSet,
    /// What reset restores
    pub reset_target: ResetTarget,
    /// Log edits to unknown fields at error level
    pub report_unknown_fields: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            rules: RuleSet::discount_codes(),
            reset_target: ResetTarget::Construction,
            report_unknown_fields: true,
        }
    }
}

impl FormConfig {
    /// Configuration without dependency rules
    pub fn without_rules() -> Self {
        FormConfig {
            rules: RuleSet::new(),
            ..FormConfig::default()
        }
    }

    /// Parse a JSON configuration document.
    ///
    /// Missing keys take their defaults; an absent `lookup_rules` keeps the
    /// discount-code table.
    pub fn from_json(json: &str) -> FormResult<Self> {
        let file: ConfigFile =
            serde_json::from_str(json).map_err(|e| FormError::InvalidConfig(e.to_string()))?;

        let rules = match file.lookup_rules {
            Some(lookups) => RuleSet::from_lookups(&lookups),
            None => RuleSet::discount_codes(),
        };

        Ok(FormConfig {
            rules,
            reset_target: file.reset_target,
            report_unknown_fields: file.report_unknown_fields,
        })
    }
}

/// On-disk shape of [`FormConfig`]
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    lookup_rules: Option<Vec<LookupRule>>,
    reset_target: ResetTarget,
    report_unknown_fields: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            lookup_rules: None,
            reset_target: ResetTarget::Construction,
            report_unknown_fields: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FormConfig::default();
        assert_eq!(config.rules.len(), 5);
        assert_eq!(config.reset_target, ResetTarget::Construction);
        assert!(config.report_unknown_fields);
        assert!(FormConfig::without_rules().rules.is_empty());
    }

    #[test]
    fn test_from_json_empty_document() {
        let config = FormConfig::from_json("{}").unwrap();
        assert_eq!(config.rules.len(), 5);
        assert_eq!(config.reset_target, ResetTarget::Construction);
    }

    #[test]
    fn test_from_json_overrides() {
        let config = FormConfig::from_json(
            r#"{
                "lookup_rules": [{ "codes": ["A", "B"], "target": "rate" }],
                "reset_target": "latest",
                "report_unknown_fields": false
            }"#,
        )
        .unwrap();

        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.reset_target, ResetTarget::Latest);
        assert!(!config.report_unknown_fields);
    }

    #[test]
    fn test_from_json_rejects_unknown_keys() {
        let err = FormConfig::from_json(r#"{ "rest_target": "latest" }"#).unwrap_err();
        assert!(matches!(err, FormError::InvalidConfig(_)));
    }
}
