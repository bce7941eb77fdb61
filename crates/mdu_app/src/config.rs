//! Page configuration (`mdu.toml`)
//!
//! Every field has a default, so an empty file yields the stock Sistema MDU
//! filter page:
//!
//! ```toml
//! log_filter = "info"
//!
//! [bootstrap]
//! retry_interval_ms = 500
//! max_attempts = 20
//!
//! [dropdown]
//! max_visible_tags = 2
//! search_enabled = true
//! focus_delay_ms = 100
//!
//! [overlay]
//! base_stack_level = 1000
//! native_expanded_height = 200.0
//!
//! [[controls]]
//! id = "filtroProjeto"
//! placeholder = "Todos os projetos"
//! ```

use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use mdu_cn::DropdownConfig;
use mdu_core::id::ControlId;
use mdu_core::retry::RetryPolicy;
use mdu_layout::overlay::CoordinatorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

// =============================================================================
// MduConfig
// =============================================================================

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MduConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub dropdown: DropdownDefaults,
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Controls to wrap, in initialization order
    #[serde(default = "default_controls")]
    pub controls: Vec<ControlConfig>,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_controls() -> Vec<ControlConfig> {
    vec![
        ControlConfig::new("filtroProjeto", "Todos os projetos"),
        ControlConfig::new("filtroSupervisor", "Todos os supervisores"),
        ControlConfig::new("filtroEquipe", "Todas as equipes"),
        ControlConfig::new("filtroCidade", "Todas as cidades"),
    ]
}

impl Default for MduConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            bootstrap: BootstrapConfig::default(),
            dropdown: DropdownDefaults::default(),
            overlay: OverlayConfig::default(),
            controls: default_controls(),
        }
    }
}

impl MduConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MduConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bootstrap.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "bootstrap.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.bootstrap.retry_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "bootstrap.retry_interval_ms must be at least 1".to_string(),
            ));
        }

        let mut seen = IndexSet::new();
        for control in &self.controls {
            let id = control.id.trim();
            if id.is_empty() {
                return Err(ConfigError::Invalid("control id must not be empty".to_string()));
            }
            if !seen.insert(id) {
                return Err(ConfigError::Invalid(format!("duplicate control id {id:?}")));
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            interval_ms: self.bootstrap.retry_interval_ms,
            max_attempts: self.bootstrap.max_attempts,
        }
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            base_stack_level: self.overlay.base_stack_level,
            native_expanded_height: self.overlay.native_expanded_height,
        }
    }

    /// Widget configuration for one control
    pub fn dropdown_config(&self, control: &ControlConfig) -> DropdownConfig {
        DropdownConfig::new(control.placeholder.clone())
            .max_visible_tags(self.dropdown.max_visible_tags)
            .search_enabled(self.dropdown.search_enabled)
            .focus_delay_ms(self.dropdown.focus_delay_ms)
    }

    /// Every configured control with its widget configuration
    pub fn control_configs(&self) -> Vec<(ControlId, DropdownConfig)> {
        self.controls
            .iter()
            .map(|c| (ControlId::new(c.id.trim()), self.dropdown_config(c)))
            .collect()
    }
}

// =============================================================================
// Sections
// =============================================================================

/// Bounded retry used while waiting for controls to be populated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BootstrapConfig {
    #[serde(default = "default_retry_interval")]
    pub retry_interval_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_retry_interval() -> u64 {
    500
}

fn default_max_attempts() -> u32 {
    20
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            retry_interval_ms: default_retry_interval(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Settings shared by every dropdown on the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DropdownDefaults {
    #[serde(default = "default_max_visible_tags")]
    pub max_visible_tags: usize,
    #[serde(default = "default_true")]
    pub search_enabled: bool,
    #[serde(default = "default_focus_delay")]
    pub focus_delay_ms: u64,
}

fn default_max_visible_tags() -> usize {
    2
}

fn default_true() -> bool {
    true
}

fn default_focus_delay() -> u64 {
    100
}

impl Default for DropdownDefaults {
    fn default() -> Self {
        Self {
            max_visible_tags: default_max_visible_tags(),
            search_enabled: true,
            focus_delay_ms: default_focus_delay(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct OverlayConfig {
    #[serde(default = "default_base_stack_level")]
    pub base_stack_level: u32,
    #[serde(default = "default_native_expanded_height")]
    pub native_expanded_height: f32,
}

fn default_base_stack_level() -> u32 {
    1000
}

fn default_native_expanded_height() -> f32 {
    200.0
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            base_stack_level: default_base_stack_level(),
            native_expanded_height: default_native_expanded_height(),
        }
    }
}

/// One control the page wraps
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ControlConfig {
    pub id: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_placeholder() -> String {
    "Selecione...".to_string()
}

impl ControlConfig {
    pub fn new(id: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            placeholder: placeholder.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = MduConfig::from_toml_str("").unwrap();
        assert_eq!(config, MduConfig::default());
        assert_eq!(config.controls.len(), 4);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.coordinator_config(), CoordinatorConfig::default());
    }

    #[test]
    fn test_partial_sections_and_controls() {
        let config = MduConfig::from_toml_str(
            r#"
            log_filter = "mdu_cn=debug"

            [bootstrap]
            max_attempts = 3

            [dropdown]
            max_visible_tags = 0

            [[controls]]
            id = "filtroCidade"
            placeholder = "Todas as cidades"

            [[controls]]
            id = "filtroStatus"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_filter, "mdu_cn=debug");
        assert_eq!(config.bootstrap.max_attempts, 3);
        assert_eq!(config.bootstrap.retry_interval_ms, 500);
        assert!(config.dropdown.search_enabled);

        let controls = config.control_configs();
        assert_eq!(controls.len(), 2);
        assert_eq!(controls[0].1.placeholder, "Todas as cidades");
        assert_eq!(controls[0].1.max_visible_tags, 0);
        assert_eq!(controls[1].1.placeholder, "Selecione...");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let zero_attempts = MduConfig::from_toml_str("[bootstrap]\nmax_attempts = 0\n");
        assert!(matches!(zero_attempts, Err(ConfigError::Invalid(_))));

        let zero_interval = MduConfig::from_toml_str("[bootstrap]\nretry_interval_ms = 0\n");
        assert!(matches!(zero_interval, Err(ConfigError::Invalid(_))));

        let duplicate = MduConfig::from_toml_str(
            "[[controls]]\nid = \"a\"\n[[controls]]\nid = \" a \"\n",
        );
        assert!(matches!(duplicate, Err(ConfigError::Invalid(_))));

        let empty = MduConfig::from_toml_str("[[controls]]\nid = \"\"\n");
        assert!(matches!(empty, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_and_io_errors() {
        assert!(matches!(
            MduConfig::from_toml_str("[bootstrap\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MduConfig::load(Path::new("/nonexistent/mdu.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
