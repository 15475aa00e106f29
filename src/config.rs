//! Engine and demo configuration.
//!
//! Read from `$XDG_CONFIG_HOME/scroll-keyframes/config.toml` (default
//! `~/.config/scroll-keyframes/config.toml`):
//!
//! ```toml
//! scroll_axis = "y"
//! throttle_ms = 90
//! easing = "linear"
//!
//! [springs.opacity]
//! stiffness = 200
//!
//! [keys]
//! scroll_down = "Down, j"
//! quit = "q"
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::animator::AnimatorOptions;
use crate::core::container::ContainerOptions;
use crate::core::geometry::Axis;
use crate::core::interpolate::Easing;
use crate::core::spring::SpringOverride;
use crate::core::style::StyleProperty;
use crate::error::{Error, Result};

// ───────────────────────────────────────── config ────────────

/// Everything the config file can set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scroll_axis: Axis,
    /// Animator update interval; `0` disables throttling.
    pub throttle_ms: u64,
    pub easing: Easing,
    /// Per-property spring overrides, keyed by camelCase property name.
    springs: HashMap<String, SpringOverride>,
    /// Scroll distance per key press or wheel notch in the demo, in rows.
    pub scroll_step: u16,
    keys: HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scroll_axis: Axis::Y,
            throttle_ms: 90,
            easing: Easing::Linear,
            springs: HashMap::new(),
            scroll_step: 3,
            keys: HashMap::new(),
        }
    }
}

impl EngineConfig {
    /// Load from the default path, falling back to defaults when the file
    /// is missing or broken.
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                warn!(%err, "ignoring config file");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn container_options(&self) -> ContainerOptions {
        ContainerOptions {
            axis: self.scroll_axis,
            throttle: self.throttle(),
        }
    }

    /// Spring overrides by property.  Unknown property names are skipped
    /// with a warning.
    pub fn springs(&self) -> HashMap<StyleProperty, SpringOverride> {
        self.springs
            .iter()
            .filter_map(|(name, spring)| match name.parse::<StyleProperty>() {
                Ok(property) => Some((property, *spring)),
                Err(err) => {
                    warn!(%err, "ignoring [springs.{name}]");
                    None
                }
            })
            .collect()
    }

    /// Animator options carrying the configured springs and easing.  The
    /// throttle comes from the container.
    pub fn animator_options(&self) -> AnimatorOptions {
        AnimatorOptions {
            throttle: None,
            springs: self.springs(),
            easing: self.easing,
        }
    }

    /// The raw `[keys]` table: action name to a comma-separated key list.
    /// The demo host turns it into key bindings.
    pub fn key_table(&self) -> &HashMap<String, String> {
        &self.keys
    }
}

/// `$XDG_CONFIG_HOME/scroll-keyframes/config.toml`.
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("scroll-keyframes").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spring::SpringConfig;

    fn write(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let (_dir, path) = write("");
        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config.scroll_axis, Axis::Y);
        assert_eq!(config.throttle(), Duration::from_millis(90));
        assert_eq!(config.easing, Easing::Linear);
        assert!(config.springs().is_empty());
    }

    #[test]
    fn spring_overrides_and_axis_are_read() {
        let (_dir, path) = write(
            r#"
scroll_axis = "x"
throttle_ms = 0
easing = "ease-in-out"

[springs.translateY]
stiffness = 250.0
damping = 12.0
"#,
        );
        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config.container_options().axis, Axis::X);
        assert_eq!(config.container_options().throttle, Duration::ZERO);

        let options = config.animator_options();
        assert_eq!(options.easing, Easing::EaseInOut);
        let translate = options.spring_config(StyleProperty::TranslateY);
        assert_eq!(translate.stiffness, 250.0);
        assert_eq!(translate.damping, 12.0);
        assert_eq!(
            translate.mass,
            SpringConfig::for_property(StyleProperty::TranslateY).mass
        );
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let (_dir, path) = write("throttle_ms = \"soon\"");
        assert!(matches!(
            EngineConfig::load_from(&path),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::load_from(&dir.path().join("nope.toml")),
            Err(Error::ConfigRead { .. })
        ));
    }

    #[test]
    fn key_table_is_kept_verbatim() {
        let (_dir, path) = write(
            r#"
[keys]
scroll_down = "Ctrl+n, s"
"#,
        );
        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(
            config.key_table().get("scroll_down").map(String::as_str),
            Some("Ctrl+n, s")
        );
    }
}
