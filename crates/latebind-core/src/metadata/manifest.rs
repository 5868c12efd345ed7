//! JSON manifests describing a universe.
//!
//! A manifest lists type definitions with their members. Signatures are type
//! names in the syntax of [`TypeUniverse::parse`]; a definition's own type
//! parameters are written `!0`, `!1`, ...
//!
//! ```json
//! { "types": [
//!   { "name": "System.Object" },
//!   { "name": "System.Func`2", "kind": "delegate", "generic_params": ["T", "TResult"],
//!     "methods": [{ "name": "Invoke", "params": ["!0"], "returns": "!1", "virtual": true }] }
//! ] }
//! ```

use serde::Deserialize;

use super::error::UniverseError;
use super::types::{ParamInfo, Passing, TypeId};
use super::universe::{FieldDef, MethodDef, TypeDef, TypeKind, TypeUniverse};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub types: Vec<ManifestType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestType {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub generic_params: Vec<String>,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub fields: Vec<ManifestField>,
    #[serde(default)]
    pub methods: Vec<ManifestMethod>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestMethod {
    pub name: String,
    #[serde(default)]
    pub params: Vec<ManifestParam>,
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
}

/// A parameter: either a bare type name or a full record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ManifestParam {
    Type(String),
    Full {
        #[serde(default)]
        name: Option<String>,
        #[serde(rename = "type")]
        ty: String,
        #[serde(default)]
        passing: Passing,
    },
}

/// Parse manifest JSON.
pub fn parse_manifest(json: &str) -> Result<Manifest, UniverseError> {
    serde_json::from_str(json).map_err(|e| UniverseError::Manifest(e.to_string()))
}

impl TypeUniverse {
    /// Build a universe from manifest JSON.
    pub fn from_manifest_json(json: &str) -> Result<Self, UniverseError> {
        let mut universe = Self::new();
        universe.load_manifest(&parse_manifest(json)?)?;
        Ok(universe)
    }

    /// Add every type of a manifest.
    ///
    /// Types are declared first and filled in second, so signatures may refer
    /// to types listed later in the same manifest.
    pub fn load_manifest(&mut self, manifest: &Manifest) -> Result<(), UniverseError> {
        let mut declared: Vec<TypeId> = Vec::with_capacity(manifest.types.len());
        for ty in &manifest.types {
            let def =
                TypeDef::new(ty.name.as_str(), ty.kind).with_generic_params(ty.generic_params.iter().cloned());
            declared.push(self.define(def)?);
        }

        for (ty, &id) in manifest.types.iter().zip(&declared) {
            if let Some(base) = &ty.base {
                let base = self.parse(base)?;
                self.set_base(id, base)?;
            }
            for field in &ty.fields {
                let def = FieldDef {
                    name: field.name.clone(),
                    ty: self.parse(&field.ty)?,
                    is_static: field.is_static,
                };
                self.add_field(id, def)?;
            }
            for method in &ty.methods {
                let def = self.manifest_method(method)?;
                self.add_method(id, def)?;
            }
        }
        Ok(())
    }

    fn manifest_method(&self, method: &ManifestMethod) -> Result<MethodDef, UniverseError> {
        let params = method
            .params
            .iter()
            .map(|p| match p {
                ManifestParam::Type(ty) => Ok(ParamInfo::new(self.parse(ty)?)),
                ManifestParam::Full { name, ty, passing } => Ok(ParamInfo {
                    name: name.clone(),
                    ty: self.parse(ty)?,
                    passing: *passing,
                }),
            })
            .collect::<Result<Vec<_>, UniverseError>>()?;

        Ok(MethodDef {
            name: method.name.clone(),
            params,
            ret: method.returns.as_deref().map(|r| self.parse(r)).transpose()?,
            is_static: method.is_static,
            is_virtual: method.is_virtual,
        })
    }
}
