//! Terraform configuration generation from a manifest.

use crate::error::{Error, Result};
use crate::hcl::{Block, Body, Expr, Key};
use crate::naming::{ProviderSpec, manifest_block_name};
use declarative::{ID_FIELD, LiveResource};
use manifest::{
    FILE_FUNCTION, Invocation, MANIFEST_ID_FUNCTION, Manifest, ManifestResource,
    SYSTEM_OBJECT_FUNCTION,
};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// What symbolic tokens are resolved against.
#[derive(Debug, Clone, Copy)]
pub struct ConfigContext<'a> {
    pub manifest: &'a Manifest,
    pub environment: &'a str,
    pub live: &'a [LiveResource],
    /// Relative `@FILE` paths are resolved against this file's directory
    pub manifest_path: Option<&'a Path>,
    pub provider: &'a ProviderSpec,
}

impl ConfigContext<'_> {
    /// Convert an attribute value into an HCL expression, resolving
    /// symbolic tokens.
    pub fn to_expression(&self, value: &Value) -> Result<Expr> {
        Ok(match value {
            Value::Null => Expr::Null,
            Value::Bool(b) => Expr::Bool(*b),
            Value::Number(n) => Expr::Number(n.clone()),
            Value::String(s) => match Invocation::detect(s) {
                Some(invocation) => self.call(&invocation?)?,
                None => Expr::String(s.clone()),
            },
            Value::Array(items) => Expr::Tuple(
                items
                    .iter()
                    .map(|item| self.to_expression(item))
                    .collect::<Result<_>>()?,
            ),
            Value::Object(object) => {
                let mut keys: Vec<&String> = object.keys().collect();
                keys.sort();
                Expr::Object(
                    keys.into_iter()
                        .map(|key| {
                            Ok((Key::Quoted(key.clone()), self.to_expression(&object[key])?))
                        })
                        .collect::<Result<_>>()?,
                )
            }
        })
    }

    fn call(&self, invocation: &Invocation) -> Result<Expr> {
        match invocation.name.as_str() {
            MANIFEST_ID_FUNCTION => self.manifest_reference(invocation),
            SYSTEM_OBJECT_FUNCTION => self.system_object(invocation),
            FILE_FUNCTION => self.file_contents(invocation),
            other => Err(Error::UnknownFunction(other.to_string())),
        }
    }

    fn manifest_reference(&self, invocation: &Invocation) -> Result<Expr> {
        let manifest_id = match (invocation.args.len(), invocation.str_arg(0)) {
            (1, Some(id)) => id,
            _ => {
                return Err(Error::Arguments {
                    function: MANIFEST_ID_FUNCTION,
                    message: "takes exactly 1 string parameter",
                });
            }
        };
        let entry = self
            .manifest
            .get(manifest_id)
            .ok_or_else(|| Error::UnknownManifestId(manifest_id.to_string()))?;
        if invocation.path.is_empty() {
            return Err(Error::MissingPathSuffix);
        }
        let mut traversal = vec![
            self.provider.resource_type(&entry.type_tag),
            manifest_block_name(&entry.manifest_id),
        ];
        traversal.extend(invocation.path.iter().cloned());
        Ok(Expr::Traversal(traversal))
    }

    fn system_object(&self, invocation: &Invocation) -> Result<Expr> {
        let (type_tag, name) = match (
            invocation.args.len(),
            invocation.str_arg(0),
            invocation.str_arg(1),
        ) {
            (2, Some(type_tag), Some(name)) => (type_tag, name),
            _ => {
                return Err(Error::Arguments {
                    function: SYSTEM_OBJECT_FUNCTION,
                    message: "takes exactly 2 string parameters",
                });
            }
        };
        let object = self
            .live
            .iter()
            .find(|r| r.is_system && r.type_tag == type_tag && r.name() == Some(name))
            .ok_or_else(|| Error::UnknownSystemObject {
                type_tag: type_tag.to_string(),
                name: name.to_string(),
            })?;
        if !invocation.path.is_empty() {
            return Err(Error::UnexpectedPathSuffix);
        }
        Ok(Expr::String(object.remote_id.clone()))
    }

    fn file_contents(&self, invocation: &Invocation) -> Result<Expr> {
        let path = match (invocation.args.len(), invocation.str_arg(0)) {
            (1, Some(path)) => self.resolve_path(path),
            _ => {
                return Err(Error::Arguments {
                    function: FILE_FUNCTION,
                    message: "takes exactly 1 string parameter",
                });
            }
        };
        if !invocation.path.is_empty() {
            return Err(Error::UnexpectedPathSuffix);
        }
        let contents =
            std::fs::read_to_string(&path).map_err(|source| Error::ReadFile { path, source })?;
        let contents = contents.strip_suffix('\n').unwrap_or(&contents);
        Ok(Expr::String(contents.to_string()))
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.manifest_path.and_then(Path::parent) {
            Some(base) => base.join(path),
            None => path.to_path_buf(),
        }
    }

    fn resource_block(&self, resource: &ManifestResource) -> Result<Block> {
        let id = resource
            .resource_id(self.environment)
            .ok_or_else(|| Error::MissingIdentifier {
                manifest_id: resource.manifest_id.clone(),
                environment: self.environment.to_string(),
            })?;
        let resource_type = self.provider.resource_type(&resource.type_tag);
        let name = manifest_block_name(&resource.manifest_id);
        let mut block = Block::new("resource", &[resource_type.as_str(), name.as_str()])
            .with_attribute(ID_FIELD, Expr::String(id.to_string()));

        // The block's id always comes from resource_uuids
        let mut keys: Vec<&String> = resource
            .attributes
            .keys()
            .filter(|key| key.as_str() != ID_FIELD)
            .collect();
        keys.sort();
        for key in keys {
            let expr = self
                .to_expression(&resource.attributes[key])
                .map_err(|e| e.in_attribute(&resource.manifest_id, key))?;
            block.body.attribute(key, expr);
        }
        Ok(block)
    }

    /// Generate the full configuration: provider requirements, provider
    /// block, then one resource block per manifest entry.
    pub fn generate_config(&self) -> Result<String> {
        let mut file = Body::new();
        file.block(Block::new("terraform", &[]).with_block(
            Block::new("required_providers", &[]).with_attribute(
                &self.provider.name,
                Expr::Object(vec![
                    (
                        Key::Ident("source".to_string()),
                        Expr::String(self.provider.source.clone()),
                    ),
                    (
                        Key::Ident("version".to_string()),
                        Expr::String(self.provider.version.clone()),
                    ),
                ]),
            ),
        ))
        .blank();
        file.block(Block::new("provider", &[self.provider.name.as_str()]))
            .blank();

        for resource in &self.manifest.resources {
            file.block(self.resource_block(resource)?).blank();
        }
        log::debug!(
            "generated configuration for {} resources",
            self.manifest.len()
        );
        Ok(file.render())
    }
}
