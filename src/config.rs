use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::models::{RiskLevel, Verdict};

/// Root configuration structure, deserialized from `.tender-checkr/config.toml`.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Risk policy rules.
    pub policy: PolicyConfig,
}

/// Defines how risk levels are turned into report verdicts.
#[derive(Debug, Deserialize)]
pub struct PolicyConfig {
    /// Verdict applied to any risk level not explicitly listed in `levels`.
    /// Defaults to `review`.
    #[serde(default = "default_policy_action")]
    pub default: PolicyAction,
    /// Per-level overrides keyed by risk label (e.g. `"CRITICAL"`, `"OK"`).
    #[serde(default)]
    pub levels: HashMap<String, PolicyAction>,
}

fn default_policy_action() -> PolicyAction {
    PolicyAction::Review
}

/// The action to take when a contractor's risk level matches a policy rule.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    /// Contractor is fine; listed only in verbose output.
    Clear,
    /// Contractor warrants review.
    Review,
    /// Contractor requires attention; shown first in every report.
    Flag,
}

impl PolicyAction {
    /// Convert to the corresponding [`Verdict`].
    pub fn to_verdict(&self) -> Verdict {
        match self {
            PolicyAction::Clear => Verdict::Clear,
            PolicyAction::Review => Verdict::Review,
            PolicyAction::Flag => Verdict::Flag,
        }
    }
}

impl Default for Config {
    /// Built-in default policy used when no config file is found.
    ///
    /// Critical and high alerts are flagged, medium and low alerts go to
    /// review, and OK contractors are clear.
    fn default() -> Self {
        let mut levels = HashMap::new();
        levels.insert("CRITICAL".to_string(), PolicyAction::Flag);
        levels.insert("HIGH".to_string(), PolicyAction::Flag);
        levels.insert("MEDIUM".to_string(), PolicyAction::Review);
        levels.insert("LOW".to_string(), PolicyAction::Review);
        levels.insert("OK".to_string(), PolicyAction::Clear);

        Config {
            policy: PolicyConfig {
                default: PolicyAction::Review,
                levels,
            },
        }
    }
}

/// Load the policy configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<data_path>/.tender-checkr/config.toml`
/// 3. `~/.config/tender-checkr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(data_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        let content = std::fs::read_to_string(path)?;
        return Ok(toml::from_str(&content)?);
    }

    let local_config = data_path.join(".tender-checkr").join("config.toml");
    if local_config.exists() {
        let content = std::fs::read_to_string(&local_config)?;
        return Ok(toml::from_str(&content)?);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("tender-checkr")
            .join("config.toml");
        if home_config.exists() {
            let content = std::fs::read_to_string(&home_config)?;
            return Ok(toml::from_str(&content)?);
        }
    }

    Ok(Config::default())
}

/// Determine the verdict for a risk level under the given policy.
pub fn apply_policy(config: &Config, risk: RiskLevel) -> Verdict {
    if let Some(action) = config.policy.levels.get(&risk.to_string()) {
        return action.to_verdict();
    }
    config.policy.default.to_verdict()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let cfg = Config::default();
        assert_eq!(apply_policy(&cfg, RiskLevel::Critical), Verdict::Flag);
        assert_eq!(apply_policy(&cfg, RiskLevel::High), Verdict::Flag);
        assert_eq!(apply_policy(&cfg, RiskLevel::Medium), Verdict::Review);
        assert_eq!(apply_policy(&cfg, RiskLevel::Low), Verdict::Review);
        assert_eq!(apply_policy(&cfg, RiskLevel::Ok), Verdict::Clear);
    }

    #[test]
    fn test_toml_override() {
        let cfg: Config = toml::from_str(
            r#"
            [policy]
            default = "clear"

            [policy.levels]
            CRITICAL = "flag"
            "#,
        )
        .unwrap();

        assert_eq!(apply_policy(&cfg, RiskLevel::Critical), Verdict::Flag);
        // Not listed → config default, not the built-in default
        assert_eq!(apply_policy(&cfg, RiskLevel::High), Verdict::Clear);
    }

    #[test]
    fn test_missing_levels_table() {
        let cfg: Config = toml::from_str(
            r#"
            [policy]
            default = "review"
            "#,
        )
        .unwrap();

        assert_eq!(apply_policy(&cfg, RiskLevel::Ok), Verdict::Review);
    }
}
