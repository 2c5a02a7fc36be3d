//! Retargeter Assets
//!
//! [`RetargeterAsset`] is everything the processor needs besides the two skeletons:
//! a rig definition per side, the chain mapping table, settings and optional
//! retarget poses. It serializes to and from JSON.
//!
//! [`RetargetConfig`] is a flatter authoring form (root bone names, chain lists and
//! a mapping table of name pairs) that converts into a [`RetargeterAsset`].

use rerig_skeleton::{BoneChain, RetargetPose};
use serde::{Deserialize, Serialize};

use crate::settings::{ChainSettings, GlobalSettings, RootSettings};

/// Retarget root and named chains of one skeleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigDefinition {
    pub retarget_root: Option<String>,
    pub chains: Vec<BoneChain>,
}

impl RigDefinition {
    #[must_use]
    pub fn new(retarget_root: Option<&str>, chains: Vec<BoneChain>) -> Self {
        Self {
            retarget_root: retarget_root.map(str::to_string),
            chains,
        }
    }

    #[must_use]
    pub fn chain_by_name(&self, name: &str) -> Option<&BoneChain> {
        self.chains.iter().find(|chain| chain.name == name)
    }
}

/// One row of the chain mapping table.
///
/// Rows without a source chain are kept (so the table lists every target chain)
/// but produce no chain pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainMapping {
    #[serde(default)]
    pub source_chain: Option<String>,
    pub target_chain: String,
    #[serde(default)]
    pub settings: ChainSettings,
}

impl ChainMapping {
    #[must_use]
    pub fn new(source_chain: Option<&str>, target_chain: impl Into<String>) -> Self {
        Self {
            source_chain: source_chain.map(str::to_string),
            target_chain: target_chain.into(),
            settings: ChainSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ChainSettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Complete retargeter configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargeterAsset {
    pub source_rig: Option<RigDefinition>,
    pub target_rig: Option<RigDefinition>,
    pub chain_mapping: Vec<ChainMapping>,
    pub global_settings: GlobalSettings,
    pub root_settings: RootSettings,
    pub source_retarget_pose: Option<RetargetPose>,
    pub target_retarget_pose: Option<RetargetPose>,
}

impl RetargeterAsset {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Settings of the row mapping onto `target_chain`, if any.
    #[must_use]
    pub fn chain_settings(&self, target_chain: &str) -> Option<&ChainSettings> {
        self.chain_mapping
            .iter()
            .find(|row| row.target_chain == target_chain)
            .map(|row| &row.settings)
    }
}

// ---------------------------------------------------------------------------
// Flat authoring form
// ---------------------------------------------------------------------------

/// Mapping row of a [`RetargetConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainMappingRow {
    pub source_chain: String,
    pub target_chain: String,
    #[serde(default = "default_true")]
    pub fk: bool,
    #[serde(default)]
    pub ik: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetConfig {
    pub source_root_bone: Option<String>,
    pub target_root_bone: Option<String>,
    pub source_chains: Vec<BoneChain>,
    pub target_chains: Vec<BoneChain>,
    pub chain_mapping: Vec<ChainMappingRow>,
}

impl RetargetConfig {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl From<RetargetConfig> for RetargeterAsset {
    fn from(config: RetargetConfig) -> Self {
        let chain_mapping = config
            .chain_mapping
            .into_iter()
            .map(|row| {
                let mut settings = ChainSettings::default();
                settings.fk.enable_fk = row.fk;
                settings.ik.enable_ik = row.ik;
                ChainMapping {
                    source_chain: Some(row.source_chain),
                    target_chain: row.target_chain,
                    settings,
                }
            })
            .collect();

        Self {
            source_rig: Some(RigDefinition {
                retarget_root: config.source_root_bone,
                chains: config.source_chains,
            }),
            target_rig: Some(RigDefinition {
                retarget_root: config.target_root_bone,
                chains: config.target_chains,
            }),
            chain_mapping,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_config_converts_to_asset() {
        let json = r#"{
            "source_root_bone": "pelvis",
            "target_root_bone": "Hips",
            "source_chains": [{ "name": "Spine", "start_bone": "spine_01", "end_bone": "spine_03" }],
            "target_chains": [{ "name": "Spine", "start_bone": "Spine", "end_bone": "Chest" }],
            "chain_mapping": [{ "source_chain": "Spine", "target_chain": "Spine", "ik": true }]
        }"#;

        let asset = RetargeterAsset::from(RetargetConfig::from_json_str(json).unwrap());
        let target_rig = asset.target_rig.as_ref().unwrap();
        assert_eq!(target_rig.retarget_root.as_deref(), Some("Hips"));
        assert_eq!(target_rig.chain_by_name("Spine").unwrap().end_bone, "Chest");

        let settings = asset.chain_settings("Spine").unwrap();
        assert!(settings.fk.enable_fk);
        assert!(settings.ik.enable_ik);
    }

    #[test]
    fn asset_json_round_trip_keeps_mapping() {
        let asset = RetargeterAsset {
            source_rig: Some(RigDefinition::new(Some("root"), vec![BoneChain::new("Arm", "a", "b")])),
            chain_mapping: vec![ChainMapping::new(None, "Arm")],
            ..RetargeterAsset::default()
        };

        let json = asset.to_json_string().unwrap();
        let back = RetargeterAsset::from_json_str(&json).unwrap();
        assert_eq!(back, asset);
        assert!(back.target_rig.is_none());
    }
}
