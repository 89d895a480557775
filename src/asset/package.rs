use std::fmt;
use std::sync::Arc;

use crate::asset::rig::CameraRigAsset;

/// Identifies the unit an asset is built and reloaded from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct PackageId(pub String);

impl PackageId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Live-edit notification: `package` was rebuilt.
///
/// `rebuilt_rigs` carries the new versions of rigs that live in that package; rigs are matched
/// to running ones by name.
#[derive(Clone, Debug)]
pub struct AssetBuildEvent {
    pub package: PackageId,
    pub rebuilt_rigs: Vec<Arc<CameraRigAsset>>,
}

impl AssetBuildEvent {
    pub fn new(package: PackageId) -> Self {
        Self {
            package,
            rebuilt_rigs: Vec::new(),
        }
    }

    pub fn with_rebuilt_rig(mut self, rig: Arc<CameraRigAsset>) -> Self {
        self.rebuilt_rigs.push(rig);
        self
    }

    pub fn rebuilt_rig(&self, name: &str) -> Option<&Arc<CameraRigAsset>> {
        self.rebuilt_rigs.iter().find(|r| r.name() == name)
    }
}
