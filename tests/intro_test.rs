use cake_scene::{
    cancel::CancellationToken,
    config::CameraConfig,
    controls::OrbitControls,
    intro::{CAMERA_DELAY, CAMERA_FLIGHT, Cue, Ease, IntroFrame, IntroSequencer, REVEAL_OPEN},
};
use cgmath::Point3;
use instant::Duration;

fn sequencer(cancel: CancellationToken) -> IntroSequencer {
    let camera = CameraConfig::default();
    IntroSequencer::new(camera.start, camera.framing, cancel)
}

/// Applies the unlock cue the way the scene does.
fn drive(intro: &mut IntroSequencer, controls: &mut OrbitControls, dt: Duration) -> Vec<Cue> {
    let frame = intro.advance(dt);
    if frame.cues.contains(&Cue::UnlockControls) {
        controls.enable();
    }
    frame.cues
}

#[test]
fn controls_should_unlock_exactly_at_the_end_of_the_flight() {
    let mut intro = sequencer(CancellationToken::new());
    let mut controls = OrbitControls::new(Point3::new(0.0, 0.0, 0.0));
    assert!(!controls.enabled);

    intro.start();
    drive(&mut intro, &mut controls, Duration::from_millis(27_999));
    assert!(!controls.enabled, "unlocked early at 27.999s");
    assert!(!controls.enable_zoom);

    let cues = drive(&mut intro, &mut controls, Duration::from_millis(2));
    assert_eq!(cues, vec![Cue::UnlockControls]);
    assert!(controls.enabled, "still locked at 28.001s");
    assert!(controls.enable_zoom);
    assert!(!controls.enable_pan);
}

#[test]
fn start_should_cue_audio_and_open_the_mask() {
    let mut intro = sequencer(CancellationToken::new());
    assert!(!intro.is_started());

    let frame = intro.start();
    assert_eq!(frame.cues, vec![Cue::StartAudio]);
    assert_eq!(frame.reveal_radius, Some(REVEAL_OPEN));
    // the camera waits for its delay
    assert_eq!(frame.camera, None);
    assert!(intro.is_started());

    // a second click does nothing
    assert_eq!(intro.start(), IntroFrame::default());
}

#[test]
fn reveal_should_close_within_two_seconds() {
    let mut intro = sequencer(CancellationToken::new());
    intro.start();

    let halfway = intro.advance(Duration::from_secs(1));
    let radius = halfway.reveal_radius.unwrap();
    assert!(radius > 0.0 && radius < REVEAL_OPEN / 2.0, "{}", radius);

    let done = intro.advance(Duration::from_secs(1));
    assert_eq!(done.reveal_radius, Some(0.0));
    assert_eq!(done.cues, vec![Cue::RevealFinished]);

    // the mask is closed, later frames leave it alone
    assert_eq!(intro.advance(Duration::from_millis(100)).reveal_radius, None);
}

#[test]
fn camera_should_fly_from_start_to_framing() {
    let camera = CameraConfig::default();
    let mut intro = sequencer(CancellationToken::new());
    intro.start();

    let before = intro.advance(CAMERA_DELAY - Duration::from_millis(500));
    assert_eq!(before.camera, None);

    let mut last = None;
    for _ in 0..40 {
        if let Some(position) = intro.advance(Duration::from_secs(1)).camera {
            last = Some(position);
        }
    }
    assert_eq!(last, Some(camera.framing));
    assert!(!intro.is_running());
    assert!(intro.elapsed() > CAMERA_DELAY + CAMERA_FLIGHT);
}

#[test]
fn long_frame_should_still_land_the_camera() {
    let camera = CameraConfig::default();
    let mut intro = sequencer(CancellationToken::new());
    intro.start();
    intro.advance(Duration::from_secs(1));

    // one frame jumps over the whole flight, as after a backgrounded tab
    let resumed = intro.advance(Duration::from_secs(40));
    assert_eq!(resumed.camera, Some(camera.framing));
    assert_eq!(resumed.reveal_radius, Some(0.0));
    assert_eq!(
        resumed.cues,
        vec![Cue::RevealFinished, Cue::UnlockControls, Cue::CameraSettled]
    );
    assert!(!intro.is_running());
}

#[test]
fn frames_before_the_flight_should_leave_the_camera_alone() {
    let mut intro = sequencer(CancellationToken::new());
    assert_eq!(intro.start().camera, None);
    assert_eq!(intro.advance(CAMERA_DELAY - Duration::from_millis(1)).camera, None);
    assert!(intro.advance(Duration::from_millis(1)).camera.is_some());
}

#[test]
fn every_cue_should_fire_once_in_order() {
    let mut intro = sequencer(CancellationToken::new());
    let mut cues = intro.start().cues;
    for _ in 0..400 {
        cues.extend(intro.advance(Duration::from_millis(100)).cues);
    }
    assert_eq!(
        cues,
        vec![
            Cue::StartAudio,
            Cue::RevealFinished,
            Cue::UnlockControls,
            Cue::CameraSettled,
        ]
    );
}

#[test]
fn cancelling_should_stop_the_timeline() {
    let cancel = CancellationToken::new();
    let mut intro = sequencer(cancel.clone());
    let mut controls = OrbitControls::new(Point3::new(0.0, 0.0, 0.0));
    intro.start();
    intro.advance(Duration::from_secs(5));

    cancel.cancel();
    assert!(!intro.is_running());
    let cues = drive(&mut intro, &mut controls, Duration::from_secs(60));
    assert!(cues.is_empty());
    assert!(!controls.enabled);
    assert_eq!(intro.elapsed(), Duration::from_secs(5));
}

#[test]
fn cancelled_sequencer_should_not_start() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut intro = sequencer(cancel);
    assert_eq!(intro.start(), IntroFrame::default());
    assert!(!intro.is_started());
}

#[test]
fn eases_should_pin_their_end_points() {
    for ease in [Ease::Linear, Ease::Power1Out, Ease::Power4Out] {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
        assert_eq!(ease.apply(2.0), 1.0);
    }
    assert_eq!(Ease::Power1Out.apply(0.5), 0.75);
    assert!(Ease::Power4Out.apply(0.5) > Ease::Power1Out.apply(0.5));
}
