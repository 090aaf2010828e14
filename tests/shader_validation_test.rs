use cake_scene::pipelines::{SHADERS, validate_wgsl};

#[test]
fn every_shader_should_pass_validation() {
    for (label, source) in SHADERS {
        if let Err(e) = validate_wgsl(label, source) {
            panic!("{}", e);
        }
    }
}

#[test]
fn fire_programs_should_expose_vertex_and_fragment_entry_points() {
    for (label, source) in SHADERS.iter().filter(|(label, _)| label.starts_with("fire")) {
        let module = validate_wgsl(label, source).unwrap();
        let stages: Vec<_> = module.entry_points.iter().map(|e| e.stage).collect();
        assert!(stages.contains(&naga::ShaderStage::Vertex), "{}", label);
        assert!(stages.contains(&naga::ShaderStage::Fragment), "{}", label);
    }
}

#[test]
fn broken_shader_should_report_its_label() {
    let err = validate_wgsl("broken", "@fragment fn fs_main() -> @location(0) vec4<f32> { return 1.0; }")
        .unwrap_err();
    assert_eq!(err.label, "broken");
    assert!(err.to_string().contains("broken"));
}
