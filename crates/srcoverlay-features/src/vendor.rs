//! Vendor feature extensions
//!
//! Extra feature entries appended to upstream feature definitions: WebUI
//! access to a few extension APIs and permission allowlists for vendor
//! extensions.

use crate::compiler::{FeatureMutator, FeatureTable};
use serde_json::{json, Value};
use srcoverlay_core::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Prefix of the source file paths handed to the feature compiler
pub const PARENT_DIR_PREFIX: &str = "../../";

/// Hashed ids of vendor extensions (uppercase SHA-1 of the extension id)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionIds {
    /// mnojpmjdmbbfmejpflffifhffcmidifd
    pub brave_shields: &'static str,
    pub ethereum_remote_client: &'static str,
    /// nibjojkomfdiaoajekhjakgkdhaomnch
    pub ipfs_companion: &'static str,
    /// hjoieblefckbooibpepigmacodalfndh
    pub ipfs_companion_beta: &'static str,
    /// lgjmpdmojkpocjcopdikifhejkkjglho
    pub web_torrent: &'static str,
}

pub const EXTENSION_IDS: ExtensionIds = ExtensionIds {
    brave_shields: "A321D47A2B4CA86898167A55CA8B2E02385EA7CD",
    ethereum_remote_client: "21070F3D60711361C1210B870439BE49B5D995F4",
    ipfs_companion: "780BF954C0F7C586EA9662D4F967771F49CC2114",
    ipfs_companion_beta: "FF32507DC3DB5DFFD1D6733187C84D4B74713D63",
    web_torrent: "3D9518A72EB02667A773B69DBA9E72E0F4A37423",
};

/// Every upstream feature file the compiler is expected to see
///
/// A file outside this list means upstream added or moved one and the
/// vendor table needs a look.
pub const KNOWN_FEATURE_FILES: [&str; 10] = [
    "chrome/common/apps/platform_apps/api/_api_features.json",
    "chrome/common/apps/platform_apps/api/_permission_features.json",
    "chrome/common/controlled_frame/api/_api_features.json",
    "chrome/common/extensions/api/_api_features.json",
    "chrome/common/extensions/api/_manifest_features.json",
    "chrome/common/extensions/api/_permission_features.json",
    "extensions/common/api/_api_features.json",
    "extensions/common/api/_behavior_features.json",
    "extensions/common/api/_manifest_features.json",
    "extensions/common/api/_permission_features.json",
];

fn object(value: Value) -> FeatureTable {
    match value {
        Value::Object(map) => map,
        _ => FeatureTable::new(),
    }
}

fn webui(matches: &[&str]) -> Value {
    json!([{
        "channel": "stable",
        "contexts": ["webui"],
        "matches": matches,
    }])
}

fn sockets_api(ids: &ExtensionIds) -> Value {
    json!([{
        "dependencies": ["manifest:sockets"],
        "contexts": ["blessed_extension"],
        "allowlist": [ids.ipfs_companion, ids.ipfs_companion_beta, ids.web_torrent],
    }])
}

fn allowlisted(extension_types: &[&str], allowlist: &[&str]) -> Value {
    json!([{
        "channel": "stable",
        "extension_types": extension_types,
        "allowlist": allowlist,
    }])
}

/// Vendor entries per upstream feature file
fn default_extensions(ids: &ExtensionIds) -> BTreeMap<String, FeatureTable> {
    let newtab = ["chrome://newtab/*"];
    let mut extensions = BTreeMap::new();

    extensions.insert(
        "chrome/common/extensions/api/_api_features.json".to_string(),
        object(json!({
            "extension.inIncognitoContext": webui(&newtab),
            "bookmarks": webui(&newtab),
            "tabs": webui(&[
                "chrome://brave-shields.top-chrome/*",
                "chrome://rewards-panel.top-chrome/*",
                "chrome://wallet-panel.top-chrome/*",
                "chrome://wallet/*",
            ]),
            "topSites": webui(&newtab),
        })),
    );
    extensions.insert(
        "chrome/common/extensions/api/_permission_features.json".to_string(),
        object(json!({
            "settingsPrivate": allowlisted(&["extension"], &[ids.brave_shields]),
        })),
    );
    extensions.insert(
        "extensions/common/api/_api_features.json".to_string(),
        object(json!({
            "sockets.tcp": sockets_api(ids),
            "sockets.tcpServer": sockets_api(ids),
            "sockets.udp": sockets_api(ids),
        })),
    );
    extensions.insert(
        "extensions/common/api/_manifest_features.json".to_string(),
        object(json!({
            "sockets": allowlisted(
                &["extension", "platform_app"],
                &[ids.ipfs_companion, ids.ipfs_companion_beta, ids.web_torrent],
            ),
        })),
    );
    extensions.insert(
        "extensions/common/api/_permission_features.json".to_string(),
        object(json!({
            "hid": allowlisted(&["extension"], &[ids.ethereum_remote_client]),
            "usbDevices": allowlisted(&["extension"], &[ids.ethereum_remote_client]),
        })),
    );

    extensions
}

/// Mutator appending vendor entries to upstream features
#[derive(Debug, Clone)]
pub struct VendorFeatureExtensions {
    known_files: BTreeSet<String>,
    extensions: BTreeMap<String, FeatureTable>,
}

impl VendorFeatureExtensions {
    /// Create the mutator with the built-in vendor table
    pub fn new() -> Result<Self> {
        Self::from_parts(
            KNOWN_FEATURE_FILES.iter().map(|f| f.to_string()).collect(),
            default_extensions(&EXTENSION_IDS),
        )
    }

    /// Create the mutator from an explicit known-file set and vendor table
    ///
    /// Every file named in `extensions` must be known.
    pub fn from_parts(
        known_files: BTreeSet<String>,
        extensions: BTreeMap<String, FeatureTable>,
    ) -> Result<Self> {
        let mutator = Self {
            known_files,
            extensions,
        };
        for file in mutator.extensions.keys() {
            mutator.ensure_known(file)?;
        }
        Ok(mutator)
    }

    /// Fail on feature files this mutator does not know about
    pub fn ensure_known(&self, source_file: &str) -> Result<()> {
        if self.known_files.contains(source_file) {
            Ok(())
        } else {
            Err(Error::Feature(format!(
                "Unknown features file {}. Please update the vendor feature extensions.",
                source_file
            )))
        }
    }

    /// Vendor entries for a feature file
    pub fn extensions_for(&self, source_file: &str) -> Option<&FeatureTable> {
        self.extensions.get(source_file)
    }
}

impl FeatureMutator for VendorFeatureExtensions {
    fn apply(&self, source_files: &[String], table: &mut FeatureTable) -> Result<()> {
        for source_file in source_files {
            let relative = source_file.strip_prefix(PARENT_DIR_PREFIX).ok_or_else(|| {
                Error::Feature(format!(
                    "Feature file {} does not start with {}",
                    source_file, PARENT_DIR_PREFIX
                ))
            })?;
            if relative.starts_with("brave/") || relative.contains("/test/") {
                continue;
            }

            self.ensure_known(relative)?;

            let Some(extensions) = self.extensions_for(relative) else {
                continue;
            };
            for (name, features) in extensions {
                let Value::Array(features) = features else {
                    return Err(Error::Feature(format!(
                        "Vendor entry {} for {} is not a list",
                        name, relative
                    )));
                };
                let existing = table.get_mut(name).ok_or_else(|| {
                    Error::Feature(format!("Feature {} not found in {}", name, relative))
                })?;

                let merged = match existing.take() {
                    Value::Array(mut list) => {
                        list.extend(features.iter().cloned());
                        list
                    }
                    single => std::iter::once(single)
                        .chain(features.iter().cloned())
                        .collect(),
                };
                debug!("Extended {} from {} to {} entries", name, relative, merged.len());
                *existing = Value::Array(merged);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "vendor-feature-extensions"
    }
}
