//! Loading and storing manifests as JSON or YAML.

use crate::error::{Error, Result};
use crate::types::Manifest;
use std::path::Path;

/// On-disk manifest encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Format::Json),
            Some("yaml" | "yml") => Ok(Format::Yaml),
            _ => Err(Error::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

impl Manifest {
    /// Parse a manifest in the given format.
    pub fn parse(content: &str, format: Format) -> Result<Self> {
        Ok(match format {
            Format::Json => serde_json::from_str(content)?,
            Format::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Serialize in the given format. JSON is pretty-printed.
    pub fn render(&self, format: Format) -> Result<String> {
        Ok(match format {
            Format::Json => {
                let mut out = serde_json::to_string_pretty(self)?;
                out.push('\n');
                out
            }
            Format::Yaml => serde_yaml::to_string(self)?,
        })
    }

    /// Load from `path`, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let format = Format::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let manifest = Self::parse(&content, format)?;
        log::debug!(
            "loaded {} resources from {}",
            manifest.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// Write to `path`, picking the format from its extension.
    ///
    /// The file is written only once serialization has succeeded.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.render(Format::from_path(path)?)?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_ENVIRONMENT, ManifestResource};
    use serde_json::json;

    fn sample() -> Manifest {
        Manifest::new(vec![
            ManifestResource::new("userstore_accessor", "accessor1")
                .with_resource_id(DEFAULT_ENVIRONMENT, "2ee0b5a0-8e1a-4c6f-9a44-6d1f0bd0b1c3")
                .with_attribute("name", "GetEmail")
                .with_attribute(
                    "columns",
                    json!([{ "column": r#"@UC_MANIFEST_ID("email").id"# }]),
                ),
        ])
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("m.json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("m.YAML")).unwrap(), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("m.yml")).unwrap(), Format::Yaml);
        assert!(matches!(
            Format::from_path(Path::new("m.toml")),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_save_and_load_preserve_tokens() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["manifest.json", "manifest.yaml"] {
            let path = tmp.path().join(name);
            sample().save(&path).unwrap();
            assert_eq!(Manifest::load(&path).unwrap(), sample());
        }
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
resources:
  - uc_terraform_type: userstore_column
    manifest_id: email
    resource_uuids:
      __DEFAULT: fe20fd48-a006-4ad8-9208-4aad540d8794
    attributes:
      name: email
      is_array: false
"#;
        let manifest = Manifest::parse(yaml, Format::Yaml).unwrap();
        let resource = &manifest.resources[0];
        assert_eq!(resource.name(), Some("email"));
        assert_eq!(
            resource.resource_id("prod"),
            Some("fe20fd48-a006-4ad8-9208-4aad540d8794")
        );
        assert_eq!(resource.attributes["is_array"], json!(false));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let manifest = Manifest::parse("{}", Format::Json).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = Manifest::load(Path::new("/nonexistent/manifest.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/manifest.json"));
    }
}
