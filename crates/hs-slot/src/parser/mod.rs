//! Theme Parser - load theme configurations from JSON or YAML
//!
//! ## Usage
//!
//! ```rust,ignore
//! let parser = ThemeParser::new();
//! let theme = parser.from_file("themes/durov.yaml")?;
//! ```
//!
//! Every loaded theme passes [`ThemeConfig::validate`] before it is returned,
//! so a malformed weight table never reaches a spin.

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::theme::ThemeConfig;

/// Theme parser
pub struct ThemeParser {
    /// Validation limits
    pub limits: ThemeLimits,
}

/// Parsing limits for untrusted theme files
#[derive(Debug, Clone)]
pub struct ThemeLimits {
    pub max_file_bytes: usize,
    pub max_name_length: usize,
    pub max_symbols: usize,
    pub max_rows: u8,
    pub max_cols: u8,
    pub max_table_entries: usize,
    pub max_initial_turns: u8,
}

impl Default for ThemeLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 1024 * 1024,
            max_name_length: 128,
            max_symbols: 64,
            max_rows: 10,
            max_cols: 10,
            max_table_entries: 64,
            max_initial_turns: 10,
        }
    }
}

impl ThemeParser {
    pub fn new() -> Self {
        Self {
            limits: ThemeLimits::default(),
        }
    }

    /// Create parser with custom limits
    pub fn with_limits(limits: ThemeLimits) -> Self {
        Self { limits }
    }

    pub fn parse_json(&self, json: &str) -> ConfigResult<ThemeConfig> {
        self.check_size(json.len())?;
        let theme: ThemeConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        self.finish(theme)
    }

    pub fn parse_yaml(&self, yaml: &str) -> ConfigResult<ThemeConfig> {
        self.check_size(yaml.len())?;
        let theme: ThemeConfig =
            serde_yml::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        self.finish(theme)
    }

    /// Load a theme file; the format follows the extension
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<ThemeConfig> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        let result = match ext.as_str() {
            "json" => self.parse_json(&text),
            "yaml" | "yml" => self.parse_yaml(&text),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        match &result {
            Ok(theme) => log::info!("loaded theme '{}' from {}", theme.id, path.display()),
            Err(err) => log::error!("theme {} rejected: {}", path.display(), err),
        }
        result
    }

    /// Limit checks for a parsed theme
    pub fn validate(&self, theme: &ThemeConfig) -> ConfigResult<()> {
        if theme.name.len() > self.limits.max_name_length {
            return Err(ConfigError::Limit(format!(
                "Theme name too long: {} > {}",
                theme.name.len(),
                self.limits.max_name_length
            )));
        }

        if theme.symbols.len() > self.limits.max_symbols {
            return Err(ConfigError::Limit(format!(
                "Too many symbols: {} > {}",
                theme.symbols.len(),
                self.limits.max_symbols
            )));
        }

        let rows = theme.grid.rows.max(theme.bonus_grid.rows);
        let cols = theme.grid.cols.max(theme.bonus_grid.cols);
        if rows > self.limits.max_rows || cols > self.limits.max_cols {
            return Err(ConfigError::Limit(format!(
                "Board too large: {}x{} > {}x{}",
                rows, cols, self.limits.max_rows, self.limits.max_cols
            )));
        }

        let tables = [Some(&theme.base_weights), Some(&theme.bonus_weights), theme.bonus_top_row_weights.as_ref()];
        for table in tables.into_iter().flatten() {
            if table.entries().len() > self.limits.max_table_entries {
                return Err(ConfigError::Limit(format!(
                    "Weight table too long: {} > {}",
                    table.entries().len(),
                    self.limits.max_table_entries
                )));
            }
        }

        if theme.initial_turns > self.limits.max_initial_turns {
            return Err(ConfigError::Limit(format!(
                "Too many initial turns: {} > {}",
                theme.initial_turns, self.limits.max_initial_turns
            )));
        }

        Ok(())
    }

    fn check_size(&self, len: usize) -> ConfigResult<()> {
        if len > self.limits.max_file_bytes {
            return Err(ConfigError::Limit(format!(
                "Theme document too large: {} > {} bytes",
                len, self.limits.max_file_bytes
            )));
        }
        Ok(())
    }

    fn finish(&self, theme: ThemeConfig) -> ConfigResult<ThemeConfig> {
        self.validate(&theme)?;
        theme.validate()?;
        Ok(theme)
    }
}

impl Default for ThemeParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::theme::{coin_up, durov, gems, WeightTable};

    #[test]
    fn test_json_roundtrip_of_builtin() {
        let json = serde_json::to_string(&durov()).unwrap();
        let theme = ThemeParser::new().parse_json(&json).unwrap();
        assert_eq!(theme, durov());
    }

    #[test]
    fn test_yaml_theme() {
        let yaml = serde_yml::to_string(&gems()).unwrap();
        let theme = ThemeParser::new().parse_yaml(&yaml).unwrap();
        assert_eq!(theme.id, "gems");
        assert_eq!(theme.sticky_scatter_spins, Some(2));
    }

    #[test]
    fn test_invalid_json() {
        let result = ThemeParser::new().parse_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_validation_runs_on_load() {
        let mut theme = durov();
        theme.bonus_weights = WeightTable::default();
        let json = serde_json::to_string(&theme).unwrap();
        assert_eq!(
            ThemeParser::new().parse_json(&json),
            Err(ConfigError::EmptyTable("bonus"))
        );
    }

    #[test]
    fn test_limits() {
        let parser = ThemeParser::with_limits(ThemeLimits {
            max_rows: 3,
            ..ThemeLimits::default()
        });
        let json = serde_json::to_string(&coin_up()).unwrap();
        assert!(matches!(parser.parse_json(&json), Err(ConfigError::Limit(_))));

        let tiny = ThemeParser::with_limits(ThemeLimits {
            max_file_bytes: 8,
            ..ThemeLimits::default()
        });
        assert!(matches!(tiny.parse_json("{\"id\": 1}"), Err(ConfigError::Limit(_))));
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("coin_up.yaml");
        let mut file = std::fs::File::create(&yaml_path).unwrap();
        file.write_all(serde_yml::to_string(&coin_up()).unwrap().as_bytes())
            .unwrap();
        assert_eq!(ThemeParser::new().from_file(&yaml_path).unwrap(), coin_up());

        let toml_path = dir.path().join("theme.toml");
        std::fs::write(&toml_path, "id = 1").unwrap();
        assert_eq!(
            ThemeParser::new().from_file(&toml_path),
            Err(ConfigError::UnsupportedFormat("toml".into()))
        );

        let missing = ThemeParser::new().from_file(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
