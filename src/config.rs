use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::VillainProfile;
use crate::preflop::{PreflopError, RangeChart};
use crate::rules::{RulesDocument, RulesError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Rules document on disk; the embedded table when `None`.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    #[serde(default)]
    pub ranges_path: Option<PathBuf>,
    #[serde(default)]
    pub strict_rules: bool,
    #[serde(default)]
    pub villain_profile: VillainProfile,
    #[serde(default)]
    pub no_color: bool,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            rules_path: None,
            ranges_path: None,
            strict_rules: false,
            villain_profile: VillainProfile::Default,
            no_color: false,
        }
    }
}

impl AdvisorConfig {
    /// Loads the rules once; the result is shared read-only from then on.
    pub fn load_rules(&self) -> Result<Arc<RulesDocument>, RulesError> {
        RulesDocument::load(self.rules_path.as_deref(), self.strict_rules).map(Arc::new)
    }

    pub fn load_ranges(&self) -> Result<RangeChart, PreflopError> {
        RangeChart::load(self.ranges_path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_embedded_documents() {
        let config = AdvisorConfig::default();
        let rules = config.load_rules().unwrap();
        assert!(rules.rule_count() > 0);
        assert!(config.load_ranges().is_ok());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: AdvisorConfig = serde_json::from_str(r#"{"strict_rules": true}"#).unwrap();
        assert!(config.strict_rules);
        assert_eq!(config.rules_path, None);
        assert_eq!(config.villain_profile, VillainProfile::Default);
    }
}
