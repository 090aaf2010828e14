use cake_scene::{
    assembler::LEAF_NODES,
    error::AssetLoadError,
    mixer::{AnimationMixer, MAX_CLIPS, start_delay},
    resources::{
        animation::{Channel, Interpolation, Keyframes, Sample},
        parse_gltf,
    },
};
use cgmath::{Quaternion, Rad, Rotation3, Vector3};
use instant::Duration;

mod common;

use crate::common::test_utils::{EMBEDDED_GLTF, approx, particle_bundle};

fn leaf_height(bundle: &cake_scene::data_structures::scene_graph::ModelBundle, leaf: usize) -> f32 {
    bundle
        .root
        .find_child(LEAF_NODES[leaf])
        .unwrap()
        .local
        .position
        .y
}

#[test]
fn clips_should_start_on_their_stagger() {
    assert_eq!(start_delay(0), Duration::from_millis(10));
    assert_eq!(start_delay(1), Duration::from_millis(10));
    assert_eq!(start_delay(2), Duration::from_millis(40));
    assert_eq!(start_delay(5), Duration::from_millis(100));

    let mut bundle = particle_bundle(6);
    let mut mixer = AnimationMixer::staggered(bundle.clips.len());
    assert_eq!(mixer.len(), 6);

    mixer.update(0.005, &mut bundle);
    assert!((0..6).all(|i| !mixer.is_playing(i)));

    mixer.update(0.006, &mut bundle);
    assert!(mixer.is_playing(0));
    assert!(mixer.is_playing(1));
    assert!(!mixer.is_playing(2));

    mixer.update(0.030, &mut bundle);
    assert!(mixer.is_playing(2));
    assert!(!mixer.is_playing(3));

    mixer.update(0.1, &mut bundle);
    assert!((0..6).all(|i| mixer.is_playing(i)));
}

#[test]
fn mixer_should_schedule_at_most_six_clips() {
    assert_eq!(AnimationMixer::staggered(10).len(), MAX_CLIPS);
    assert!(AnimationMixer::staggered(0).is_empty());

    let mut bundle = particle_bundle(0);
    let mut mixer = AnimationMixer::staggered(0);
    mixer.update(1.0, &mut bundle);
    assert_eq!(leaf_height(&bundle, 0), 0.0);
}

#[test]
fn playing_clips_should_pose_their_nodes_and_loop() {
    let mut bundle = particle_bundle(1);
    let mut mixer = AnimationMixer::staggered(1);

    mixer.update(0.01, &mut bundle);
    mixer.update(0.5, &mut bundle);
    let time = mixer.clip_time(0).unwrap();
    assert!(approx(time, 0.5), "{}", time);
    assert!(approx(leaf_height(&bundle, 0), 0.5));
    // world transforms follow
    assert!(approx(
        bundle
            .root
            .find_child(LEAF_NODES[0])
            .unwrap()
            .world_transform()
            .position
            .y,
        0.5
    ));

    mixer.update(0.75, &mut bundle);
    assert!(approx(leaf_height(&bundle, 0), 0.25));
    // nodes without a clip stay put
    assert_eq!(leaf_height(&bundle, 1), 0.0);
}

#[test]
fn mixer_should_skip_actions_without_a_clip() {
    let mut bundle = particle_bundle(2);
    let mut mixer = AnimationMixer::staggered(6);
    mixer.update(0.5, &mut bundle);
    assert!(mixer.is_playing(5));
    assert!(approx(leaf_height(&bundle, 1), 0.49));
}

#[test]
fn channel_should_clamp_and_interpolate() {
    let channel = Channel {
        node: 0,
        keyframes: Keyframes::Scale(vec![Vector3::new(1.0, 1.0, 1.0), Vector3::new(3.0, 3.0, 3.0)]),
        timestamps: vec![1.0, 2.0],
        interpolation: Interpolation::Linear,
    };
    assert_eq!(channel.sample(0.0), Some(Sample::Scale(Vector3::new(1.0, 1.0, 1.0))));
    assert_eq!(channel.sample(1.5), Some(Sample::Scale(Vector3::new(2.0, 2.0, 2.0))));
    assert_eq!(channel.sample(9.0), Some(Sample::Scale(Vector3::new(3.0, 3.0, 3.0))));

    let step = Channel {
        interpolation: Interpolation::Step,
        ..channel
    };
    assert_eq!(step.sample(1.9), Some(Sample::Scale(Vector3::new(1.0, 1.0, 1.0))));
}

#[test]
fn rotations_should_stay_normalized() {
    let channel = Channel {
        node: 0,
        keyframes: Keyframes::Rotation(vec![
            Quaternion::from_angle_y(Rad(0.0)),
            Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_2)),
        ]),
        timestamps: vec![0.0, 1.0],
        interpolation: Interpolation::Linear,
    };
    let Some(Sample::Rotation(q)) = channel.sample(0.5) else {
        panic!("expected a rotation sample");
    };
    let expected = Quaternion::from_angle_y(Rad(std::f32::consts::FRAC_PI_4));
    assert!(approx(q.s, expected.s));
    assert!(approx(q.v.y, expected.v.y));
}

#[test]
fn empty_channels_should_yield_nothing() {
    let channel = Channel {
        node: 0,
        keyframes: Keyframes::Other,
        timestamps: vec![0.0],
        interpolation: Interpolation::Linear,
    };
    assert_eq!(channel.sample(0.0), None);
}

#[test]
fn should_parse_embedded_gltf() {
    let bundle = parse_gltf("fixture.gltf", EMBEDDED_GLTF.as_bytes()).unwrap();

    let fire = bundle.root.find_child("Fire1").unwrap();
    assert_eq!(fire.index, Some(0));
    assert_eq!(fire.mesh, Some(0));

    assert_eq!(bundle.meshes.len(), 1);
    assert_eq!(bundle.meshes[0].name, "flame");
    let primitive = &bundle.meshes[0].primitives[0];
    assert_eq!(primitive.vertices.len(), 3);
    assert_eq!(primitive.vertices[1].position, [1.0, 0.0, 0.0]);
    // no index accessor: one index per vertex
    assert_eq!(primitive.indices, vec![0, 1, 2]);

    assert_eq!(bundle.clips.len(), 1);
    let clip = &bundle.clips[0];
    assert_eq!(clip.name, "flicker");
    assert_eq!(clip.duration, 1.0);
    assert_eq!(
        clip.channels[0].sample(0.5),
        Some(Sample::Translation(Vector3::new(0.0, 1.0, 0.0)))
    );
}

#[test]
fn unreadable_gltf_should_name_its_path() {
    let err = parse_gltf("models/broken.glb", b"not a gltf").unwrap_err();
    assert!(matches!(err, AssetLoadError::Gltf { .. }));
    assert_eq!(err.path(), "models/broken.glb");
}
