//! Configuration structures for the preview pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PdfSnapError;

/// Main configuration for pdfsnap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfSnapConfig {
    /// PDF engine configuration.
    pub engine: EngineConfig,

    /// Page export configuration.
    pub export: ExportConfig,
}

/// Which PDF engine decodes and rasterizes pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// PDFium: full rasterization, needs the PDFium shared library.
    #[default]
    Pdfium,
    /// lopdf: page geometry only, renders blank pages.
    Lopdf,
}

/// PDF engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine to use.
    pub backend: EngineKind,

    /// Directory containing the PDFium shared library (searched first).
    pub library_dir: Option<PathBuf>,
}

/// Page export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported `page_<n>.png` files are written to.
    pub output_dir: PathBuf,

    /// Replace an existing file with the same name.
    pub overwrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            overwrite: true,
        }
    }
}

impl PdfSnapConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PdfSnapError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PdfSnapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read a value by dotted key (e.g. `"export.output_dir"`).
    pub fn get(&self, key: &str) -> crate::Result<serde_json::Value> {
        let json = serde_json::to_value(self).map_err(|e| PdfSnapError::Config(e.to_string()))?;

        key.split('.')
            .try_fold(&json, |current, part| current.get(part))
            .cloned()
            .ok_or_else(|| PdfSnapError::Config(format!("configuration key not found: {}", key)))
    }

    /// Set a value by dotted key.
    ///
    /// `value` is parsed as JSON first and falls back to a plain string, so
    /// `false` and `"false"` both set a boolean.
    pub fn set(&mut self, key: &str, value: &str) -> crate::Result<()> {
        let parsed: serde_json::Value = serde_json::from_str(value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

        let mut json =
            serde_json::to_value(&*self).map_err(|e| PdfSnapError::Config(e.to_string()))?;

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };

        let mut current = &mut json;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                current = current.get_mut(part).ok_or_else(|| {
                    PdfSnapError::Config(format!("configuration path not found: {}", key))
                })?;
            }
        }

        let object = current
            .as_object_mut()
            .ok_or_else(|| PdfSnapError::Config("cannot set value at non-object path".into()))?;
        if !object.contains_key(leaf) {
            return Err(PdfSnapError::Config(format!(
                "configuration key not found: {}",
                key
            )));
        }
        object.insert(leaf.to_string(), parsed);

        *self = serde_json::from_value(json)
            .map_err(|e| PdfSnapError::Config(format!("invalid value for {}: {}", key, e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = PdfSnapConfig::default();
        assert_eq!(config.engine.backend, EngineKind::Pdfium);
        assert_eq!(config.export.output_dir, PathBuf::from("."));
        assert!(config.export.overwrite);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: PdfSnapConfig =
            serde_json::from_str(r#"{ "engine": { "backend": "lopdf" } }"#).unwrap();
        assert_eq!(config.engine.backend, EngineKind::Lopdf);
        assert_eq!(config.export, ExportConfig::default());
    }

    #[test]
    fn test_get_and_set_dotted_keys() {
        let mut config = PdfSnapConfig::default();

        config.set("export.overwrite", "false").unwrap();
        config.set("export.output_dir", "/tmp/pages").unwrap();
        config.set("engine.backend", "lopdf").unwrap();

        assert_eq!(config.get("export.overwrite").unwrap(), serde_json::json!(false));
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/pages"));
        assert_eq!(config.engine.backend, EngineKind::Lopdf);
    }

    #[test]
    fn test_set_rejects_unknown_keys_and_bad_values() {
        let mut config = PdfSnapConfig::default();

        assert!(config.set("export.colour", "red").is_err());
        assert!(config.set("render.scale", "2").is_err());
        assert!(config.set("engine.backend", "ghostscript").is_err());
        assert_eq!(config, PdfSnapConfig::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PdfSnapConfig::default();
        config.engine.library_dir = Some(PathBuf::from("/opt/pdfium/lib"));
        config.save(&path).unwrap();

        assert_eq!(PdfSnapConfig::from_file(&path).unwrap(), config);
    }
}
