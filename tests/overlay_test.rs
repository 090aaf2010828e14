use cake_scene::{
    audio::BackgroundAudio,
    config::{SceneConfig, is_debug_fragment},
    overlay::{LogOverlay, Overlay, reveal_clip_path},
};

#[test]
fn mask_should_be_centred_below_the_middle() {
    assert_eq!(reveal_clip_path(100.0), "circle(100% at 50% 62%)");
    assert_eq!(reveal_clip_path(0.0), "circle(0% at 50% 62%)");
    assert_eq!(reveal_clip_path(-3.0), "circle(0% at 50% 62%)");
}

#[test]
fn log_overlay_should_accept_every_state_change() {
    let mut overlay: Box<dyn Overlay> = Box::new(LogOverlay::new());
    overlay.set_progress(30);
    overlay.set_progress(30);
    overlay.hide_progress();
    overlay.show_retry(&["textures/candle.jpg".to_string()]);
    overlay.show_content();
    overlay.set_reveal_radius(50.0);
    overlay.show_error("bundle `models/birthday.glb` is missing required node(s): Fire3");
}

#[test]
fn native_audio_should_be_requested_once_without_playing() {
    let config = SceneConfig::default();
    let mut audio = BackgroundAudio::new(config.audio);
    assert_eq!(audio.path(), "songs/bgsong.mp3");
    assert!(!audio.is_requested());
    audio.play();
    assert!(audio.is_requested());
    // there is no native output, so nothing reports as playing
    assert!(!audio.is_playing());
    audio.play();
    assert!(audio.is_requested());
    assert!(!audio.is_playing());
}

#[test]
fn debug_panel_should_need_the_exact_fragment() {
    assert!(is_debug_fragment("#debug"));
    assert!(!is_debug_fragment("#Debug"));
    assert!(!is_debug_fragment(""));
    assert!(!SceneConfig::default().debug);
}
