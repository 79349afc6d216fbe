//! Live state from a recorded JSON snapshot.
//!
//! The snapshot is a JSON object mapping each type tag to the list of API
//! objects of that type, as the tenant API returns them:
//!
//! ```json
//! {
//!   "userstore_column": [{ "id": "…", "name": "email", "type": "string" }],
//!   "transformer": []
//! }
//! ```

use anyhow::{Context, Result, bail};
use declarative::{LiveSource, RawModel, Registry};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// [`LiveSource`] backed by a snapshot file.
#[derive(Debug, Default)]
pub struct SnapshotSource {
    models: BTreeMap<String, Vec<RawModel>>,
}

impl SnapshotSource {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read live snapshot {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid live snapshot {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content)?;
        let Value::Object(types) = root else {
            bail!("expected an object mapping resource types to lists");
        };

        let mut models = BTreeMap::new();
        for (type_tag, items) in types {
            let Value::Array(items) = items else {
                bail!("{type_tag}: expected a list of objects");
            };
            let list = items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(object) => Ok(RawModel::from_json(object)),
                    _ => bail!("{type_tag}[{index}]: expected an object"),
                })
                .collect::<Result<Vec<_>>>()?;
            models.insert(type_tag, list);
        }
        Ok(Self { models })
    }

    /// Type tags in the snapshot that the registry does not know; their
    /// objects are never listed.
    pub fn unknown_types<'a>(&'a self, registry: &'a Registry) -> impl Iterator<Item = &'a str> {
        self.models
            .keys()
            .map(String::as_str)
            .filter(|tag| !registry.contains(tag))
    }
}

impl LiveSource for SnapshotSource {
    fn list(&self, type_tag: &str) -> Result<Vec<RawModel>> {
        Ok(self.models.get(type_tag).cloned().unwrap_or_default())
    }
}

/// Load a snapshot and normalize it into live resources.
pub fn load_live(path: &Path, registry: &Registry) -> Result<Vec<declarative::LiveResource>> {
    let source = SnapshotSource::load(path)?;
    for tag in source.unknown_types(registry) {
        log::warn!("live snapshot: ignoring unknown resource type {tag}");
    }
    let live = declarative::collect_live_resources(registry, &source)
        .with_context(|| format!("Could not read live resources from {}", path.display()))?;
    log::info!("loaded {} live resources", live.len());
    Ok(live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
        "userstore_column": [
            { "id": "fe20fd48-a006-4ad8-9208-4aad540d8794", "name": "email", "type": "string" },
            { "id": "c860a6d7-c632-4f81-8f5f-597290a9f437", "name": "phone", "type": "string" }
        ],
        "userstore_table": []
    }"#;

    #[test]
    fn test_parse_and_list() {
        let source = SnapshotSource::parse(SNAPSHOT).unwrap();
        assert_eq!(source.list("userstore_column").unwrap().len(), 2);
        assert!(source.list("transformer").unwrap().is_empty());

        let registry = Registry::userclouds();
        let unknown: Vec<_> = source.unknown_types(&registry).collect();
        assert_eq!(unknown, vec!["userstore_table"]);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert!(SnapshotSource::parse("[]").is_err());
        assert!(SnapshotSource::parse(r#"{"transformer": {}}"#).is_err());
        let err = SnapshotSource::parse(r#"{"transformer": [1]}"#).unwrap_err();
        assert!(err.to_string().contains("transformer[0]"));
    }

    #[test]
    fn test_load_live() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("live.json");
        fs::write(&path, SNAPSHOT).unwrap();

        let live = load_live(&path, &Registry::userclouds()).unwrap();

        assert_eq!(live.len(), 2);
        assert_eq!(live[0].remote_id, "fe20fd48-a006-4ad8-9208-4aad540d8794");
        assert_eq!(live[0].name(), Some("email"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SnapshotSource::load(Path::new("/nonexistent/live.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/live.json"));
    }
}
