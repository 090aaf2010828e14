use cake_scene::{
    assembler::{FIRE_NODES, LEAF_NODES, Manifest, assemble, fire_material},
    materials::MaterialKey,
};

mod common;

use crate::common::test_utils::{cake_bundle, cake_bundle_without, particle_bundle};

#[test]
fn should_bind_every_manifest_node_to_its_material() {
    let mut bundle = cake_bundle();
    let manifest = Manifest::cake();
    assemble(&mut bundle, &manifest).unwrap();

    for (name, key) in &manifest.entries {
        let node = bundle.root.find_child(name).unwrap();
        assert_eq!(node.material, Some(*key), "material of {}", name);
    }
    assert_eq!(
        bundle.root.find_child("NamePlate1").unwrap().material,
        Some(MaterialKey::Nameplate)
    );
    assert_eq!(
        bundle.root.find_child("Alas1").unwrap().material,
        Some(MaterialKey::GoldMatcap)
    );
    assert_eq!(bundle.root.local.position.y, -0.25);
}

#[test]
fn should_alternate_fire_programs_by_flame_number() {
    assert_eq!(fire_material(1), MaterialKey::FireA);
    assert_eq!(fire_material(2), MaterialKey::FireB);
    assert_eq!(fire_material(5), MaterialKey::FireA);

    let mut bundle = cake_bundle();
    assemble(&mut bundle, &Manifest::cake()).unwrap();
    let programs: Vec<_> = FIRE_NODES
        .iter()
        .map(|name| bundle.root.find_child(name).unwrap().material.unwrap())
        .collect();
    assert_eq!(
        programs,
        vec![
            MaterialKey::FireA,
            MaterialKey::FireB,
            MaterialKey::FireA,
            MaterialKey::FireB,
            MaterialKey::FireA,
        ]
    );
}

#[test]
fn descendants_should_draw_with_their_ancestors_material() {
    let mut bundle = cake_bundle();
    assemble(&mut bundle, &Manifest::cake()).unwrap();

    let drawables = bundle.drawables();
    // 12 top-level nodes plus the wick
    assert_eq!(drawables.len(), 13);
    assert!(drawables.iter().all(|d| d.material.is_some()));
    let candle_materials = drawables
        .iter()
        .filter(|d| d.material == Some(MaterialKey::Candle))
        .count();
    // Candle1, its wick and Extra
    assert_eq!(candle_materials, 3);
}

#[test]
fn assembling_twice_should_change_nothing() {
    let manifest = Manifest::cake();
    let mut once = cake_bundle();
    assemble(&mut once, &manifest).unwrap();
    let mut twice = once.clone();
    assemble(&mut twice, &manifest).unwrap();

    assert_eq!(once.drawables(), twice.drawables());
    assert_eq!(once.root.local, twice.root.local);
    assert_eq!(once.root.count(), twice.root.count());
}

#[test]
fn should_reject_bundle_with_missing_nodes_and_name_all_of_them() {
    let mut bundle = cake_bundle_without(&["Fire3", "RedCherry"]);
    let before = bundle.drawables();

    let err = assemble(&mut bundle, &Manifest::cake()).unwrap_err();
    assert_eq!(err.bundle, "models/birthday.glb");
    assert_eq!(err.missing, vec!["RedCherry".to_string(), "Fire3".to_string()]);
    let message = err.to_string();
    assert!(message.contains("RedCherry"), "{}", message);
    assert!(message.contains("Fire3"), "{}", message);

    // nothing was assigned
    assert_eq!(bundle.drawables(), before);
    assert!(bundle.drawables().iter().all(|d| d.material.is_none()));
}

#[test]
fn should_match_node_names_exactly() {
    let mut bundle = cake_bundle_without(&["Extra"]);
    bundle
        .root
        .add_child(cake_scene::data_structures::scene_graph::SceneNode::new("extra"));
    let err = Manifest::cake().validate(&bundle).unwrap_err();
    assert_eq!(err.missing, vec!["Extra".to_string()]);
}

#[test]
fn should_place_particles_with_the_sakura_material() {
    let mut bundle = particle_bundle(6);
    let manifest = Manifest::particles();
    assemble(&mut bundle, &manifest).unwrap();

    for name in LEAF_NODES {
        assert_eq!(
            bundle.root.find_child(name).unwrap().material,
            Some(MaterialKey::Sakura)
        );
    }
    let root = bundle.root.local;
    assert_eq!(root.position, cgmath::Vector3::new(-3.5, -5.0, 0.0));
    assert_eq!(root.scale, cgmath::Vector3::new(0.5, 0.5, 0.5));
}
