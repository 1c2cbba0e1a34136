//! Tracker configuration loaded from TOML.

use crate::access::REQUIRED_CAPABILITY;
use crate::error::Result;
use crate::presentation::DEFAULT_EDIT_LINK;
use crate::scan::MatchMode;
use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "module-tracker.toml";

/// Application directory under the platform config directory.
const CONFIG_DIR_NAME: &str = "module-usage-tracker";

/// Settings for stores, registry, scanning and access control.
///
/// ```toml
/// content_dir = "content"
/// registry = "modules.toml"
/// edit_link = "https://example.org/wp-admin/post.php?post={id}&action=edit"
/// match_mode = "boundary"
/// cache = true
///
/// [access]
/// secret = "change-me"
/// capabilities = ["manage_options"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerConfig {
    /// Directory of exported documents
    pub content_dir: PathBuf,
    /// Module registry manifest
    pub registry: PathBuf,
    /// Edit-link pattern with an `{id}` placeholder
    pub edit_link: String,
    pub match_mode: MatchMode,
    /// Share scans between requests while the corpus is unchanged
    pub cache: bool,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Session secret for the anti-forgery token. A per-process secret is used when absent.
    pub secret: Option<String>,
    /// Capabilities granted to the operator
    pub capabilities: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            registry: PathBuf::from("modules.toml"),
            edit_link: DEFAULT_EDIT_LINK.to_string(),
            match_mode: MatchMode::default(),
            cache: true,
            access: AccessConfig::default(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            secret: None,
            capabilities: vec![REQUIRED_CAPABILITY.to_string()],
        }
    }
}

impl TrackerConfig {
    /// Load a config file. Relative paths inside it resolve against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.content_dir = resolve_path(base, &config.content_dir);
        config.registry = resolve_path(base, &config.registry);
        Ok(config)
    }

    /// Load the explicit config if given, otherwise the first config found in
    /// the current directory or the platform config directory, otherwise defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let expanded = PathBuf::from(&*expand_tilde(&path.to_string_lossy()));
            return Self::load(&expanded);
        }

        let candidates = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml")),
        ];
        for candidate in candidates.into_iter().flatten() {
            if candidate.is_file() {
                tracing::debug!("Using config file {}", candidate.display());
                return Self::load(&candidate);
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    let expanded = PathBuf::from(&*expand_tilde(&path.to_string_lossy()));
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
