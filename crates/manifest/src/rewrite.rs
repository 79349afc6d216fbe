//! Replacing references and externally stored values with symbolic tokens.

use crate::error::{Error, Result};
use crate::invocation::Invocation;
use crate::types::{Manifest, ManifestResource};
use declarative::{
    LiveResource, Registry, ResourceTypeDescriptor, is_unset_reference, join_path,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Directory receiving attribute values stored outside the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternValuesDir {
    /// Where the files are written
    pub absolute_path: PathBuf,
    /// Same directory as seen from the manifest, used in `@FILE` tokens
    pub relative_from_manifest: String,
}

impl ExternValuesDir {
    /// `<stem>_values` next to the manifest at `manifest_path`.
    pub fn for_manifest(manifest_path: &Path) -> Self {
        let stem = manifest_path
            .file_stem()
            .map_or_else(|| "manifest".to_string(), |s| s.to_string_lossy().into_owned());
        let dir_name = format!("{stem}_values");
        let parent = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        Self {
            absolute_path: parent.join(&dir_name),
            relative_from_manifest: format!("./{dir_name}"),
        }
    }

    /// Remove any previous contents and create the directory.
    pub fn prepare(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.absolute_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&self.absolute_path, e)),
        }
        std::fs::create_dir_all(&self.absolute_path)
            .map_err(|e| Error::io(&self.absolute_path, e))
    }
}

/// State the rewriter resolves references against.
#[derive(Debug, Clone, Copy)]
pub struct RewriteContext<'a> {
    pub registry: &'a Registry,
    pub manifest: &'a Manifest,
    pub environment: &'a str,
    pub live: &'a [LiveResource],
    pub extern_values: Option<&'a ExternValuesDir>,
}

impl ManifestResource {
    /// Attributes with references and external values replaced by tokens.
    ///
    /// Errors are wrapped with this entry's manifest ID and the top-level
    /// attribute being rewritten.
    pub fn rewrite_with_function_calls(
        &self,
        ctx: &RewriteContext<'_>,
    ) -> Result<Map<String, Value>> {
        let descriptor = ctx.registry.lookup(&self.type_tag)?;
        self.attributes
            .iter()
            .map(|(key, value)| {
                let rewritten = rewrite_value(value, key, self, descriptor, ctx)
                    .map_err(|e| e.in_attribute(&self.manifest_id, key))?;
                Ok((key.clone(), rewritten))
            })
            .collect()
    }
}

fn rewrite_value(
    value: &Value,
    path: &str,
    resource: &ManifestResource,
    descriptor: &ResourceTypeDescriptor,
    ctx: &RewriteContext<'_>,
) -> Result<Value> {
    if let Value::String(id) = value
        && let Some(target) = ctx.registry.reference_target(&descriptor.type_tag, path)?
    {
        return rewrite_reference(id, path, &target.type_tag, ctx).map(Value::String);
    }

    if let Some(extension) = descriptor.external_at(path)
        && let Some(dir) = ctx.extern_values
    {
        let Value::String(contents) = value else {
            return Err(Error::ExternalValueNotString {
                path: path.to_string(),
            });
        };
        return write_external(contents, path, extension, resource, dir).map(Value::String);
    }

    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| rewrite_value(item, path, resource, descriptor, ctx))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(object) => object
            .iter()
            .map(|(key, item)| {
                let rewritten =
                    rewrite_value(item, &join_path(path, key), resource, descriptor, ctx)?;
                Ok((key.clone(), rewritten))
            })
            .collect::<Result<Map<_, _>>>()
            .map(Value::Object),
        _ => Ok(value.clone()),
    }
}

fn rewrite_reference(
    id: &str,
    path: &str,
    target: &str,
    ctx: &RewriteContext<'_>,
) -> Result<String> {
    // Unset references stay literal
    if is_unset_reference(id) {
        return Ok(id.to_string());
    }
    if let Some(entry) = ctx.manifest.find_by_resource_id(target, ctx.environment, id) {
        return Ok(Invocation::manifest_id(&entry.manifest_id).to_string());
    }
    let system = ctx
        .live
        .iter()
        .find(|r| r.is_system && r.type_tag == target && r.remote_id == id);
    match system {
        Some(object) => {
            let name = object.name().ok_or_else(|| Error::UnnamedSystemObject {
                type_tag: target.to_string(),
                id: id.to_string(),
            })?;
            Ok(Invocation::system_object(target, name).to_string())
        }
        None => Err(Error::UnresolvedReference {
            type_tag: target.to_string(),
            path: path.to_string(),
            id: id.to_string(),
        }),
    }
}

fn write_external(
    contents: &str,
    path: &str,
    extension: &str,
    resource: &ManifestResource,
    dir: &ExternValuesDir,
) -> Result<String> {
    let name_or_id = resource.name().unwrap_or(&resource.manifest_id);
    let attribute = path.replace('.', "_");
    let mut file_name = format!(
        "{}_{}_{attribute}{extension}",
        resource.type_tag,
        file_safe(name_or_id),
    );
    let mut target = dir.absolute_path.join(&file_name);
    // Same-named resources of one type get their manifest ID appended
    if target.exists() {
        let unique = format!(
            "{}_{}_{}_{attribute}{extension}",
            resource.type_tag,
            file_safe(name_or_id),
            file_safe(&resource.manifest_id),
        );
        log::warn!(
            "{} is already used by another {}, writing {} to {unique} instead",
            file_name,
            resource.type_tag,
            resource.manifest_id
        );
        file_name = unique;
        target = dir.absolute_path.join(&file_name);
    }
    std::fs::write(&target, format!("{contents}\n")).map_err(|e| Error::io(&target, e))?;
    log::debug!("wrote {} to {}", path, target.display());
    Ok(Invocation::file(&format!("{}/{file_name}", dir.relative_from_manifest)).to_string())
}

fn file_safe(s: &str) -> String {
    s.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_ENVIRONMENT;
    use declarative::ErrorCategory;
    use serde_json::json;

    const COL: &str = "12b3f133-4ad1-4f11-9d7d-313eb7cb95fa";
    const TRANSFORMER: &str = "c0b5b2a1-0b1f-4b9f-8b1a-1b1f4b9f8b1a";

    fn accessor(columns: Value) -> ManifestResource {
        ManifestResource::new("userstore_accessor", "accessor1").with_attribute("columns", columns)
    }

    fn ctx<'a>(
        registry: &'a Registry,
        manifest: &'a Manifest,
        live: &'a [LiveResource],
    ) -> RewriteContext<'a> {
        RewriteContext {
            registry,
            manifest,
            environment: "prod",
            live,
            extern_values: None,
        }
    }

    #[test]
    fn test_rewrite_manifest_references() {
        let registry = Registry::userclouds();
        let manifest = Manifest::new(vec![
            ManifestResource::new("userstore_column", "examplecol").with_resource_id("prod", COL),
            ManifestResource::new("transformer", "exampletransformer")
                .with_resource_id(DEFAULT_ENVIRONMENT, TRANSFORMER),
        ]);
        let resource = accessor(json!([{ "column": COL, "transformer": TRANSFORMER }]));

        let out = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &[]))
            .unwrap();

        assert_eq!(
            out["columns"],
            json!([{
                "column": r#"@UC_MANIFEST_ID("examplecol").id"#,
                "transformer": r#"@UC_MANIFEST_ID("exampletransformer").id"#
            }])
        );
    }

    #[test]
    fn test_rewrite_system_object_references() {
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let live = vec![
            LiveResource::new("userstore_column", COL)
                .system()
                .with_attribute("name", "example"),
            LiveResource::new("transformer", TRANSFORMER)
                .system()
                .with_attribute("name", "tform"),
        ];
        let resource = accessor(json!([{ "column": COL, "transformer": TRANSFORMER }]));

        let out = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &live))
            .unwrap();

        assert_eq!(
            out["columns"],
            json!([{
                "column": r#"@UC_SYSTEM_OBJECT("userstore_column", "example")"#,
                "transformer": r#"@UC_SYSTEM_OBJECT("transformer", "tform")"#
            }])
        );
    }

    #[test]
    fn test_reference_sequences_rewrite_each_element() {
        let registry = Registry::userclouds();
        let purpose = "8a4d4ed0-1c6b-4e09-9a8d-0f5f2a3b4c5d";
        let manifest = Manifest::new(vec![
            ManifestResource::new("userstore_purpose", "marketing")
                .with_resource_id(DEFAULT_ENVIRONMENT, purpose),
        ]);
        let resource = ManifestResource::new("userstore_accessor", "accessor1")
            .with_attribute("purposes", json!([purpose]));

        let out = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &[]))
            .unwrap();

        assert_eq!(out["purposes"], json!([r#"@UC_MANIFEST_ID("marketing").id"#]));
    }

    #[test]
    fn test_unresolved_reference_fails() {
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let resource = accessor(json!([{ "column": COL }]));

        let err = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &[]))
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::UnresolvedReference);
        let message = err.to_string();
        assert!(message.contains("accessor1"));
        assert!(message.contains("columns"));
    }

    #[test]
    fn test_unset_references_pass_through() {
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let nil = "00000000-0000-0000-0000-000000000000";
        let resource = accessor(json!([{ "column": nil, "transformer": null }]));

        let out = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &[]))
            .unwrap();

        assert_eq!(out["columns"], json!([{ "column": nil, "transformer": null }]));
    }

    #[test]
    fn test_non_reference_values_are_unchanged() {
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let resource = ManifestResource::new("userstore_column", "col1")
            .with_attribute("name", "col1")
            .with_attribute("index_type", "indexed")
            .with_attribute("constraints", json!({ "unique_required": true }));

        let out = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &[]))
            .unwrap();

        assert_eq!(out, resource.attributes);
    }

    #[test]
    fn test_external_values_are_written_to_files() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let dir = ExternValuesDir {
            absolute_path: tmp.path().to_path_buf(),
            relative_from_manifest: ".".into(),
        };
        let resource = ManifestResource::new("transformer", "transformer_TestTransformer")
            .with_attribute("name", "TestTransformer")
            .with_attribute("function", "hello world");

        let mut rewrite = ctx(&registry, &manifest, &[]);
        rewrite.extern_values = Some(&dir);
        let out = resource.rewrite_with_function_calls(&rewrite).unwrap();

        assert_eq!(
            out["function"],
            json!(r#"@FILE("./transformer_TestTransformer_function.js")"#)
        );
        let contents =
            std::fs::read_to_string(tmp.path().join("transformer_TestTransformer_function.js"))
                .unwrap();
        assert_eq!(contents, "hello world\n");
    }

    #[test]
    fn test_same_named_external_values_get_distinct_files() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let dir = ExternValuesDir {
            absolute_path: tmp.path().to_path_buf(),
            relative_from_manifest: ".".into(),
        };
        let first = ManifestResource::new("transformer", "first")
            .with_attribute("name", "Shared")
            .with_attribute("function", "one");
        let second = ManifestResource::new("transformer", "second")
            .with_attribute("name", "Shared")
            .with_attribute("function", "two");

        let mut rewrite = ctx(&registry, &manifest, &[]);
        rewrite.extern_values = Some(&dir);
        let first_out = first.rewrite_with_function_calls(&rewrite).unwrap();
        let second_out = second.rewrite_with_function_calls(&rewrite).unwrap();

        assert_eq!(
            first_out["function"],
            json!(r#"@FILE("./transformer_Shared_function.js")"#)
        );
        assert_eq!(
            second_out["function"],
            json!(r#"@FILE("./transformer_Shared_second_function.js")"#)
        );
        let read = |name: &str| std::fs::read_to_string(tmp.path().join(name)).unwrap();
        assert_eq!(read("transformer_Shared_function.js"), "one\n");
        assert_eq!(read("transformer_Shared_second_function.js"), "two\n");
    }

    #[test]
    fn test_external_values_stay_inline_without_sink() {
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let resource = ManifestResource::new("transformer", "t1").with_attribute("function", "x");

        let out = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &[]))
            .unwrap();

        assert_eq!(out["function"], json!("x"));
    }

    #[test]
    fn test_external_value_must_be_string() {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let dir = ExternValuesDir {
            absolute_path: tmp.path().to_path_buf(),
            relative_from_manifest: ".".into(),
        };
        let resource = ManifestResource::new("transformer", "t1").with_attribute("function", 7);

        let mut rewrite = ctx(&registry, &manifest, &[]);
        rewrite.extern_values = Some(&dir);
        let err = resource.rewrite_with_function_calls(&rewrite).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_unknown_type_fails() {
        let registry = Registry::userclouds();
        let manifest = Manifest::default();
        let resource = ManifestResource::new("userstore_table", "t1");

        let err = resource
            .rewrite_with_function_calls(&ctx(&registry, &manifest, &[]))
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Registry);
    }

    #[test]
    fn test_extern_values_dir_for_manifest() {
        let dir = ExternValuesDir::for_manifest(Path::new("/work/tenant.yaml"));
        assert_eq!(dir.absolute_path, PathBuf::from("/work/tenant_values"));
        assert_eq!(dir.relative_from_manifest, "./tenant_values");
    }

    #[test]
    fn test_prepare_clears_previous_values() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ExternValuesDir::for_manifest(&tmp.path().join("tenant.json"));
        dir.prepare().unwrap();
        std::fs::write(dir.absolute_path.join("stale.js"), "old").unwrap();

        dir.prepare().unwrap();

        assert!(dir.absolute_path.is_dir());
        assert_eq!(std::fs::read_dir(&dir.absolute_path).unwrap().count(), 0);
    }
}
