//! Configuration for the task intelligence bot.
//!
//! Loading order, later sources winning:
//! 1. Built-in defaults
//! 2. Optional TOML config file
//! 3. Environment variables (`NOTION_TOKEN`, `NOTION_DB_*`,
//!    `SLACK_SIGNING_SECRET`, `PORT`, `INTEL_*`)
//!
//! A department whose collection id is absent is skipped at fetch time, not
//! treated as an error. That silent-skip behavior is a product decision;
//! flip it by checking `configured_departments` at startup if reporting is
//! preferred.

use crate::error::{IntelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntelConfig {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub departments: Vec<DepartmentConfig>,
    pub cache: CacheConfig,
    pub context: ContextConfig,
    pub gateway: GatewayConfig,
    pub delivery: DeliveryConfig,
    pub display: DisplayConfig,
    pub roster: RosterConfig,
}

/// HTTP server binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Task-source API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// API token (`NOTION_TOKEN`). Without it every fetch is skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    pub base_url: String,
    pub api_version: String,
    /// Records per page when paginating a collection.
    pub page_size: usize,
    /// Per-collection fetch timeout.
    pub timeout_secs: u64,
}

/// One department collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentConfig {
    pub name: String,
    /// Remote collection identifier; `None` disables this department.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
}

/// Aggregation snapshot cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

/// Conversation context memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub ttl_secs: u64,
}

/// Command gateway behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Webhook signing secret (`SLACK_SIGNING_SECRET`). When absent the
    /// signature check is skipped, which is only acceptable in development.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,
    /// Maximum age of a signed request timestamp.
    pub max_signature_age_secs: u64,
    /// Soft budget for the background processing phase.
    pub processing_timeout_secs: u64,
}

/// Delayed-delivery retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

/// Report rendering limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub max_items: usize,
}

/// Known team members and the source user-id lookup table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub people: Vec<String>,
    pub user_ids: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: "https://api.notion.com".to_string(),
            api_version: "2022-06-28".to_string(),
            page_size: 100,
            timeout_secs: 25,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 120 }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { ttl_secs: 3600 }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            max_signature_age_secs: 300,
            processing_timeout_secs: 28,
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 500,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { max_items: 6 }
    }
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            source: SourceConfig::default(),
            departments: vec![
                DepartmentConfig {
                    name: "Operations".to_string(),
                    collection_id: None,
                },
                DepartmentConfig {
                    name: "Commercial".to_string(),
                    collection_id: None,
                },
                DepartmentConfig {
                    name: "Tech".to_string(),
                    collection_id: None,
                },
                DepartmentConfig {
                    name: "Finance".to_string(),
                    collection_id: None,
                },
            ],
            cache: CacheConfig::default(),
            context: ContextConfig::default(),
            gateway: GatewayConfig::default(),
            delivery: DeliveryConfig::default(),
            display: DisplayConfig::default(),
            roster: RosterConfig::default(),
        }
    }
}

/// Environment variable carrying the collection id for a default department.
fn collection_env_var(department: &str) -> Option<&'static str> {
    match department {
        "Operations" => Some("NOTION_DB_OPS"),
        "Commercial" => Some("NOTION_DB_COMM"),
        "Tech" => Some("NOTION_DB_TECH"),
        "Finance" => Some("NOTION_DB_FIN"),
        _ => None,
    }
}

impl IntelConfig {
    /// Load configuration: defaults, then an optional TOML file, then
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML file (missing keys fall back to
    /// defaults).
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| IntelError::config(format!("Failed to read config: {e}")))?;
        toml::from_str(&content)
            .map_err(|e| IntelError::config(format!("Failed to parse config: {e}")))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NOTION_TOKEN") {
            if !val.is_empty() {
                self.source.api_token = Some(val);
            }
        }
        if let Ok(val) = std::env::var("INTEL_SOURCE_BASE_URL") {
            self.source.base_url = val;
        }
        for dept in &mut self.departments {
            if let Some(var) = collection_env_var(&dept.name) {
                if let Ok(val) = std::env::var(var) {
                    if !val.is_empty() {
                        dept.collection_id = Some(val);
                    }
                }
            }
        }
        if let Ok(val) = std::env::var("SLACK_SIGNING_SECRET") {
            if !val.is_empty() {
                self.gateway.signing_secret = Some(val);
            }
        }
        if let Ok(val) = std::env::var("PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("INTEL_CACHE_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                self.cache.ttl_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("INTEL_CONTEXT_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                self.context.ttl_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("INTEL_TEAM") {
            let people: Vec<String> = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            if !people.is_empty() {
                self.roster.people = people;
            }
        }
    }

    /// Departments that actually have a collection id. The rest are
    /// silently skipped (see module docs).
    pub fn configured_departments(&self) -> Vec<DepartmentConfig> {
        self.departments
            .iter()
            .filter(|d| d.collection_id.is_some())
            .cloned()
            .collect()
    }

    /// Department display names, for the classifier vocabulary.
    pub fn department_names(&self) -> Vec<String> {
        self.departments.iter().map(|d| d.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = IntelConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.context.ttl_secs, 3600);
        assert_eq!(config.gateway.max_signature_age_secs, 300);
        assert_eq!(config.display.max_items, 6);
        assert_eq!(config.departments.len(), 4);
        assert!(config.configured_departments().is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [cache]
            ttl_secs = 60

            [[departments]]
            name = "Tech"
            collection_id = "db-tech"

            [roster]
            people = ["Alice", "Bob"]
            "#
        )
        .unwrap();

        let config = IntelConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.configured_departments().len(), 1);
        assert_eq!(config.roster.people, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_bad_toml_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cache = 12").unwrap();
        let err = IntelConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, IntelError::Config(_)));
    }
}
