//! Configuration structures for the klx pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Standalone field mapping file honoured in the working directory.
pub const FIELD_MAPPING_FILE: &str = "field_mapping_config.json";

/// Main configuration for the klx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KlxConfig {
    /// PDF conversion configuration.
    pub pdf: PdfConfig,

    /// Spreadsheet export configuration.
    pub export: ExportConfig,

    /// HTTP server configuration.
    pub server: ServerConfig,
}

/// Which PDF-to-text backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterKind {
    /// In-process layout reconstruction on top of pdf-extract.
    #[default]
    Builtin,
    /// The poppler `pdftotext -layout` executable.
    Pdftotext,
}

/// PDF conversion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Conversion backend.
    pub converter: ConverterKind,

    /// Points per character column.
    pub x_density: f64,

    /// Points per text line.
    pub y_density: f64,

    /// Horizontal gap (points) that separates two words.
    pub x_tolerance: f64,

    /// Vertical distance (points) within which glyphs share a line.
    pub y_tolerance: f64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            converter: ConverterKind::Builtin,
            x_density: 7.25,
            y_density: 13.0,
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

/// Spreadsheet export configuration.
///
/// The field names match the `field_mapping_config.json` layout so
/// that file can be deserialized straight into this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Template workbook that is filled in place.
    pub template_file: PathBuf,

    /// First (1-based) row that receives data.
    pub start_row: u32,

    /// Header row of the template (1-based).
    pub header_row: u32,

    /// Template sheet to read; the first sheet is used if it is missing.
    pub sheet_name: String,

    /// Record field name → column letter.
    pub field_mapping: BTreeMap<String, String>,

    /// Output workbook path.
    pub output_file: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let field_mapping = [
            ("invoice_number", "M"),
            ("our_company_address", "AB"),
            ("our_tax_id", "AC"),
            ("invoice_date", "L"),
            ("net_amount", "AQ"),
            ("tax_rate", "AO"),
            ("tax_amount", "AP"),
            ("total_amount", "AR"),
            ("currency", "AA"),
            ("vendor_name", "V"),
            ("vendor_address", "X"),
            ("vendor_tax_id", "W"),
        ]
        .into_iter()
        .map(|(field, column)| (field.to_string(), column.to_string()))
        .collect();

        Self {
            template_file: PathBuf::from("Template/export_template.xlsx"),
            start_row: 5,
            header_row: 1,
            sheet_name: "Sheet1".to_string(),
            field_mapping,
            output_file: PathBuf::from("FORMAL_ALL_OU_COMPANIES.xlsx"),
        }
    }
}

impl ExportConfig {
    /// Load a standalone field mapping file.
    pub fn from_mapping_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,

    /// Preferred port.
    pub port: u16,

    /// Last port tried when the preferred one is taken.
    pub port_range_end: u16,

    /// Where uploaded PDFs are stored.
    pub upload_dir: PathBuf,

    /// Where converted layout text is written.
    pub debug_txt_dir: PathBuf,

    /// Built frontend served at `/`.
    pub frontend_dir: PathBuf,

    /// Maximum multipart body size in bytes.
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            port_range_end: 8200,
            upload_dir: PathBuf::from("temp_uploads"),
            debug_txt_dir: PathBuf::from("debug_txt"),
            frontend_dir: PathBuf::from("frontend/dist"),
            max_upload_size: 200 * 1024 * 1024,
        }
    }
}

impl KlxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Load from `path` (or defaults) and apply a field mapping file found in
    /// `working_dir`.
    pub fn load(path: Option<&Path>, working_dir: &Path) -> Result<Self, std::io::Error> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_mapping_override(&working_dir.join(FIELD_MAPPING_FILE));
        Ok(config)
    }

    /// Replace the export section with a standalone mapping file if present.
    ///
    /// A mapping file that cannot be parsed resets the section to the
    /// default mapping. The configured output path is kept in both cases.
    pub fn apply_mapping_override(&mut self, mapping_path: &Path) {
        if !mapping_path.exists() {
            return;
        }

        let export = match ExportConfig::from_mapping_file(mapping_path) {
            Ok(export) => {
                debug!("Using field mapping from {}", mapping_path.display());
                export
            }
            Err(e) => {
                warn!(
                    "Failed to load field mapping {}: {}; using default mapping",
                    mapping_path.display(),
                    e
                );
                ExportConfig::default()
            }
        };

        let output_file = std::mem::take(&mut self.export.output_file);
        self.export = export;
        // The mapping file format has no output path of its own.
        if self.export.output_file == ExportConfig::default().output_file {
            self.export.output_file = output_file;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_mapping() {
        let config = ExportConfig::default();
        assert_eq!(config.start_row, 5);
        assert_eq!(config.field_mapping.get("invoice_number").map(String::as_str), Some("M"));
        assert_eq!(config.field_mapping.get("total_amount").map(String::as_str), Some("AR"));
        assert_eq!(config.field_mapping.len(), 12);
    }

    #[test]
    fn test_mapping_file_partial_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FIELD_MAPPING_FILE);
        std::fs::write(
            &path,
            r#"{"template_file": "tpl.xlsx", "start_row": 3, "field_mapping": {"invoice_number": "B"}}"#,
        )
        .unwrap();

        let mut config = KlxConfig::default();
        config.export.output_file = PathBuf::from("custom.xlsx");
        config.apply_mapping_override(&path);

        assert_eq!(config.export.template_file, PathBuf::from("tpl.xlsx"));
        assert_eq!(config.export.start_row, 3);
        assert_eq!(config.export.sheet_name, "Sheet1");
        assert_eq!(config.export.field_mapping.len(), 1);
        assert_eq!(config.export.output_file, PathBuf::from("custom.xlsx"));
    }

    #[test]
    fn test_broken_mapping_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FIELD_MAPPING_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let mut config = KlxConfig::default();
        config.export.start_row = 9;
        config.export.template_file = PathBuf::from("custom_template.xlsx");
        config.export.field_mapping.clear();
        config.export.output_file = PathBuf::from("custom.xlsx");
        config.apply_mapping_override(&path);

        let defaults = ExportConfig::default();
        assert_eq!(config.export.start_row, defaults.start_row);
        assert_eq!(config.export.template_file, defaults.template_file);
        assert_eq!(config.export.field_mapping, defaults.field_mapping);
        assert_eq!(config.export.output_file, PathBuf::from("custom.xlsx"));
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = KlxConfig::default();
        config.server.port = 9100;
        config.pdf.converter = ConverterKind::Pdftotext;
        config.save(&path).unwrap();

        let loaded = KlxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.server.port, 9100);
        assert_eq!(loaded.pdf.converter, ConverterKind::Pdftotext);
    }
}
