use cake_scene::{
    camera::PerspectiveCamera,
    config::CameraConfig,
    controls::OrbitControls,
    debug::{
        Binding, ControlKind, DebugPanel, DebugTargets, Edit, Value, changes, controls_ui, snap,
    },
    materials::{FireUniforms, SharedUniforms},
    pipelines::bloom::BloomSettings,
};
use cgmath::Point3;

mod common;

use crate::common::test_utils::approx;

struct Scene {
    bloom: BloomSettings,
    uniforms: SharedUniforms,
    camera: PerspectiveCamera,
    controls: OrbitControls,
}

impl Scene {
    fn new() -> Self {
        Self {
            bloom: BloomSettings::default(),
            uniforms: SharedUniforms::new(FireUniforms::default()),
            camera: PerspectiveCamera::new(&CameraConfig::default(), 1.5),
            controls: OrbitControls::new(Point3::new(0.0, 0.0, 0.0)),
        }
    }

    fn targets(&mut self) -> DebugTargets<'_> {
        DebugTargets {
            bloom: &mut self.bloom,
            uniforms: &self.uniforms,
            camera: &mut self.camera,
            controls: &mut self.controls,
        }
    }
}

fn number(binding: Binding, value: f32) -> Edit {
    Edit {
        binding,
        value: Value::Number(value),
    }
}

#[test]
fn snap_should_clamp_then_round_to_the_step() {
    assert_eq!(snap(7.0, 0.0, 5.0, 0.001), 5.0);
    assert_eq!(snap(-1.0, 0.0, 5.0, 0.001), 0.0);
    assert!(approx(snap(2.34567, 0.0, 5.0, 0.001), 2.346));
    assert!(approx(snap(0.26, 0.0, 1.0, 0.25), 0.25));
    assert_eq!(snap(f32::NAN, 0.0, 5.0, 0.001), 0.0);
    // a zero step only clamps
    assert_eq!(snap(1.23456, 0.0, 5.0, 0.0), 1.23456);
}

#[test]
fn panel_should_group_controls_into_three_folders() {
    let panel = DebugPanel::new(false);
    let titles: Vec<_> = panel.folders().iter().map(|f| f.title).collect();
    assert_eq!(titles, vec!["Bloom", "Uniform", "Camera & Controls"]);
    assert!(!panel.is_visible());

    let strength = panel.control(Binding::BloomStrength).unwrap();
    assert_eq!(
        strength.kind,
        ControlKind::Slider {
            min: 0.0,
            max: 5.0,
            step: 0.001
        }
    );
    let speed = panel.control(Binding::AnimationMultiplier).unwrap();
    assert!(matches!(speed.kind, ControlKind::Slider { max, .. } if max == 20.0));
    assert_eq!(
        panel.control(Binding::BloomEnabled).unwrap().kind,
        ControlKind::Toggle
    );
}

#[test]
fn edits_should_be_clamped_before_they_reach_the_scene() {
    let panel = DebugPanel::new(true);
    let mut scene = Scene::new();

    let stored = panel.apply(number(Binding::BloomStrength, 9.0), &mut scene.targets());
    assert_eq!(stored, Some(Value::Number(5.0)));
    assert_eq!(scene.bloom.strength, 5.0);

    panel.apply(number(Binding::EmissiveMultiplier, 1.5), &mut scene.targets());
    assert!(approx(scene.uniforms.get().emissive_multiplier, 1.5));

    panel.apply(number(Binding::FrequencyY, -3.0), &mut scene.targets());
    assert_eq!(scene.uniforms.get().frequency, [0.12, 0.0]);

    panel.apply(number(Binding::CameraZ, 4.0), &mut scene.targets());
    assert!(approx(scene.camera.position.z, 4.0));

    panel.apply(number(Binding::TargetY, 0.5), &mut scene.targets());
    assert!(approx(scene.controls.target.y, 0.5));
}

#[test]
fn toggle_should_switch_bloom_off() {
    let panel = DebugPanel::new(true);
    let mut scene = Scene::new();
    assert!(scene.bloom.enabled);

    let stored = panel.apply(
        Edit {
            binding: Binding::BloomEnabled,
            value: Value::Bool(false),
        },
        &mut scene.targets(),
    );
    assert_eq!(stored, Some(Value::Bool(false)));
    assert!(!scene.bloom.enabled);
}

#[test]
fn queued_edits_should_apply_on_the_next_frame() {
    let mut panel = DebugPanel::new(true);
    let mut scene = Scene::new();
    let sender = panel.sender();
    sender
        .unbounded_send(number(Binding::BloomRadius, 0.75))
        .unwrap();
    sender
        .unbounded_send(number(Binding::OpacityMultiplier, 2.0))
        .unwrap();

    // nothing changes until the frame loop drains the queue
    assert_eq!(scene.bloom.radius, BloomSettings::default().radius);

    assert_eq!(panel.apply_pending(&mut scene.targets()), 2);
    assert!(approx(scene.bloom.radius, 0.75));
    assert!(approx(scene.uniforms.get().opacity_multiplier, 2.0));
    assert_eq!(panel.apply_pending(&mut scene.targets()), 0);
}

#[test]
fn camera_controls_should_follow_the_scene() {
    let panel = DebugPanel::new(true);
    let mut scene = Scene::new();
    scene.camera.position = Point3::new(1.0, 2.0, 3.0);

    let listened = panel.listened(&scene.targets());
    assert_eq!(listened.len(), 6);
    assert!(listened.contains(&(Binding::CameraY, Value::Number(2.0))));
    assert!(listened.contains(&(Binding::TargetX, Value::Number(0.0))));
    assert!(
        listened
            .iter()
            .all(|(binding, _)| !matches!(binding, Binding::BloomStrength))
    );
}

#[test]
fn only_moved_widgets_should_produce_edits() {
    let panel = DebugPanel::new(true);
    let mut scene = Scene::new();
    let before = panel.snapshot(&scene.targets());
    assert_eq!(before.len(), 15);

    let mut after = before.clone();
    assert!(changes(&before, &after).is_empty());
    for (binding, value) in after.iter_mut() {
        match binding {
            Binding::BloomEnabled => *value = Value::Bool(false),
            Binding::FrequencyX => *value = Value::Number(3.5),
            _ => (),
        }
    }
    let edits = changes(&before, &after);
    assert_eq!(
        edits,
        vec![
            Edit {
                binding: Binding::BloomEnabled,
                value: Value::Bool(false),
            },
            number(Binding::FrequencyX, 3.5),
        ]
    );

    let sender = panel.sender();
    let mut panel = panel;
    for edit in edits {
        sender.unbounded_send(edit).unwrap();
    }
    assert_eq!(panel.apply_pending(&mut scene.targets()), 2);
    assert!(!scene.bloom.enabled);
    assert!(approx(scene.uniforms.get().frequency[0], 3.5));
}

#[test]
fn egui_window_should_lay_out_every_folder_without_editing() {
    let panel = DebugPanel::new(true);
    let mut scene = Scene::new();
    let before = panel.snapshot(&scene.targets());
    let mut after = before.clone();

    let ctx = egui::Context::default();
    let mut shapes = Vec::new();
    // the first pass only measures the window
    for _ in 0..3 {
        ctx.begin_pass(egui::RawInput::default());
        controls_ui(&ctx, panel.folders(), &mut after);
        shapes = ctx.end_pass().shapes;
    }
    assert!(!shapes.is_empty());
    // no input means no widget moved
    assert!(changes(&before, &after).is_empty());
}
