use cake_scene::materials::{
    FireUniforms, MaterialBank, MaterialKey, MaterialKind, SharedUniforms, TextureKey,
};

#[test]
fn both_fire_materials_should_share_one_uniform_block() {
    let bank = MaterialBank::new(FireUniforms::default());
    let a = bank.uniforms_of(MaterialKey::FireA).unwrap();
    let b = bank.uniforms_of(MaterialKey::FireB).unwrap();

    assert!(a.ptr_eq(b));
    assert!(a.ptr_eq(bank.uniforms()));

    bank.set_time(12.5);
    assert_eq!(a.get().time, 12.5);
    assert_eq!(b.get().time, 12.5);

    // an edit through one handle is seen through the other
    a.update(|u| u.emissive_multiplier = 3.0);
    assert_eq!(b.get().emissive_multiplier, 3.0);
}

#[test]
fn separate_blocks_should_not_alias() {
    let one = SharedUniforms::new(FireUniforms::default());
    let other = SharedUniforms::new(FireUniforms::default());
    assert!(!one.ptr_eq(&other));
    assert!(one.ptr_eq(&one.clone()));

    one.set_time(1.0);
    assert_eq!(other.get().time, 0.0);
}

#[test]
fn only_fire_materials_should_carry_uniforms() {
    let bank = MaterialBank::new(FireUniforms::default());
    for key in MaterialKey::ALL {
        let has_uniforms = bank.uniforms_of(key).is_some();
        let is_fire = matches!(key, MaterialKey::FireA | MaterialKey::FireB);
        assert_eq!(has_uniforms, is_fire, "{:?}", key);
    }
}

#[test]
fn bank_should_hold_one_material_per_key() {
    let bank = MaterialBank::new(FireUniforms::default());
    assert_eq!(bank.materials().len(), MaterialKey::ALL.len());
    for key in MaterialKey::ALL {
        assert_eq!(bank.get(key).key, key);
    }
    assert!(matches!(
        bank.get(MaterialKey::Sakura).kind,
        MaterialKind::Translucent {
            map: TextureKey::Leaf
        }
    ));
    assert_eq!(
        bank.get(MaterialKey::FireB).textures(),
        vec![TextureKey::FireOpacity, TextureKey::FireEmissive]
    );
}

#[test]
fn uniform_block_should_be_std140_sized() {
    assert_eq!(std::mem::size_of::<FireUniforms>() % 16, 0);
    let defaults = FireUniforms::default();
    assert_eq!(defaults.time, 0.0);
    assert_eq!(defaults.frequency, [0.12, 0.12]);
}
