//! Scene assembly.
//!
//! A [`Manifest`] binds node names authored in a model file to materials of the
//! bank and says where the bundle goes in the world. [`assemble`] checks the
//! manifest against a freshly loaded bundle before touching it: a bundle that
//! lacks any required node is rejected as a whole.

use cgmath::Rad;

use crate::{
    data_structures::{instance::Instance, scene_graph::ModelBundle},
    error::SceneGraphIntegrityError,
    materials::MaterialKey,
};

/// Names of the candle flames, in authoring order.
pub const FIRE_NODES: [&str; 5] = ["Fire1", "Fire2", "Fire3", "Fire4", "Fire5"];

/// Leaf emitters of the particle bundle.
pub const LEAF_NODES: [&str; 6] = [
    "particle058",
    "particle065",
    "particle072",
    "particle073",
    "particle082",
    "particle086",
];

#[derive(Clone, Debug, PartialEq)]
pub struct Manifest {
    /// Node name to material, looked up among the bundle's top-level nodes.
    pub entries: Vec<(String, MaterialKey)>,
    /// Transform of the bundle root.
    pub placement: Instance,
}

/// Flame material for the 1-based flame number: odd numbers run program A,
/// even ones program B so neighbouring flames don't flicker in phase.
pub fn fire_material(number: usize) -> MaterialKey {
    if number % 2 == 1 {
        MaterialKey::FireA
    } else {
        MaterialKey::FireB
    }
}

impl Manifest {
    pub fn cake() -> Self {
        let mut entries: Vec<(String, MaterialKey)> = [
            ("Alas1", MaterialKey::GoldMatcap),
            ("BaseCake1", MaterialKey::ColorPalette),
            ("Decor1", MaterialKey::ColorPalette),
            ("NamePlate1", MaterialKey::Nameplate),
            ("Candle1", MaterialKey::Candle),
            ("Extra", MaterialKey::Candle),
            ("RedCherry", MaterialKey::RedCherry),
        ]
        .into_iter()
        .map(|(name, key)| (name.to_string(), key))
        .collect();
        entries.extend(
            FIRE_NODES
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.to_string(), fire_material(idx + 1))),
        );
        Self {
            entries,
            placement: Instance::new().with_position(0.0, -0.25, 0.0),
        }
    }

    pub fn particles() -> Self {
        Self {
            entries: LEAF_NODES
                .iter()
                .map(|name| (name.to_string(), MaterialKey::Sakura))
                .collect(),
            placement: Instance::new()
                .with_position(-3.5, -5.0, 0.0)
                .with_uniform_scale(0.5)
                .with_rotation_y(Rad(-std::f32::consts::FRAC_PI_2)),
        }
    }

    /// Every required node absent from the bundle's top level, in manifest
    /// order.
    pub fn missing(&self, bundle: &ModelBundle) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, _)| bundle.root.find_child(name).is_none())
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn validate(&self, bundle: &ModelBundle) -> Result<(), SceneGraphIntegrityError> {
        let missing = self.missing(bundle);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SceneGraphIntegrityError {
                bundle: bundle.name.clone(),
                missing,
            })
        }
    }
}

/// Validates the bundle, assigns materials and places the root.
///
/// Running it again on the same bundle leaves it unchanged.
pub fn assemble(bundle: &mut ModelBundle, manifest: &Manifest) -> Result<(), SceneGraphIntegrityError> {
    manifest.validate(bundle)?;
    for (name, key) in &manifest.entries {
        if let Some(node) = bundle.root.find_child_mut(name) {
            node.material = Some(*key);
        }
    }
    bundle.root.local = manifest.placement;
    bundle.update_world_transforms();
    log::info!(
        "assembled {} ({} materials assigned)",
        bundle.name,
        manifest.entries.len()
    );
    Ok(())
}
