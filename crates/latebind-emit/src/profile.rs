//! Names of the binder facility the emitted code calls.
//!
//! Defaults describe the C# runtime binder. A profile can be loaded from
//! JSON; missing keys keep their defaults.
//!
//! ```json
//! { "binder_type": "My.Binder", "factories": { "get_member": "Fetch" } }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("cannot read binder profile {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid binder profile: {0}")]
    Json(#[from] serde_json::Error),
}

/// Binder factory method names, one per dynamic operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactoryNames {
    pub get_member: String,
    pub set_member: String,
    pub get_index: String,
    pub set_index: String,
    pub invoke_member: String,
    pub invoke: String,
    pub convert: String,
    pub is_event: String,
}

impl Default for FactoryNames {
    fn default() -> Self {
        Self {
            get_member: "GetMember".into(),
            set_member: "SetMember".into(),
            get_index: "GetIndex".into(),
            set_index: "SetIndex".into(),
            invoke_member: "InvokeMember".into(),
            invoke: "Invoke".into(),
            convert: "Convert".into(),
            is_event: "IsEvent".into(),
        }
    }
}

/// Type and member names of a binder facility.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinderProfile {
    /// Static class declaring the factories.
    pub binder_type: String,
    pub factories: FactoryNames,
    pub argument_info_type: String,
    pub argument_info_factory: String,
    /// Generic call-site class, `CallSite<T>`.
    pub call_site_type: String,
    pub call_site_factory: String,
    /// Delegate field of a call site.
    pub call_site_target: String,
    pub delegate_invoke: String,
    pub type_type: String,
    pub type_from_handle: String,
    pub runtime_handle_type: String,
}

impl Default for BinderProfile {
    fn default() -> Self {
        Self {
            binder_type: "Microsoft.CSharp.RuntimeBinder.Binder".into(),
            factories: FactoryNames::default(),
            argument_info_type: "Microsoft.CSharp.RuntimeBinder.CSharpArgumentInfo".into(),
            argument_info_factory: "Create".into(),
            call_site_type: "System.Runtime.CompilerServices.CallSite`1".into(),
            call_site_factory: "Create".into(),
            call_site_target: "Target".into(),
            delegate_invoke: "Invoke".into(),
            type_type: "System.Type".into(),
            type_from_handle: "GetTypeFromHandle".into(),
            runtime_handle_type: "System.RuntimeTypeHandle".into(),
        }
    }
}

impl BinderProfile {
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
