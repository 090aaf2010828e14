use cake_scene::{
    assembler::{Manifest, assemble},
    overlay::{LoadingStatus, UiCommand},
    resources::loader::{LoadingManager, progress_percent},
};
use futures::channel::mpsc;
use instant::Duration;

mod common;

use crate::common::test_utils::{RecordingOverlay, cake_bundle_without};

const CAKE: &str = "models/birthday.glb";
const CANDLE: &str = "textures/candle.jpg";

/// A loading manager whose callbacks post [`UiCommand`]s, the way the scene
/// wires it.
fn posting_manager() -> (LoadingManager, mpsc::UnboundedReceiver<UiCommand>) {
    let (commands, received) = mpsc::unbounded();
    let progress = commands.clone();
    let manager = LoadingManager::new(
        move |failed| {
            let _ = commands.unbounded_send(UiCommand::LoadingFinished {
                failed: failed.to_vec(),
            });
        },
        move |loaded, total| {
            let _ = progress.unbounded_send(UiCommand::Progress(progress_percent(loaded, total)));
        },
    );
    (manager, received)
}

fn drain(received: &mut mpsc::UnboundedReceiver<UiCommand>, status: &mut LoadingStatus) {
    while let Ok(Some(command)) = received.try_next() {
        status.apply(command);
    }
}

#[test]
fn clean_load_should_offer_begin_after_the_delay() {
    let (mut manager, mut received) = posting_manager();
    let (overlay, calls) = RecordingOverlay::new();
    let mut status = LoadingStatus::new(Box::new(overlay), Duration::from_secs(2));

    manager.item_start(CAKE);
    manager.item_start(CANDLE);
    manager.item_end(CAKE, true);
    manager.item_end(CANDLE, true);
    drain(&mut received, &mut status);

    status.advance(Duration::from_millis(1500));
    assert!(!status.is_ready());
    status.advance(Duration::from_millis(600));
    assert!(status.is_ready());
    assert_eq!(
        *calls.borrow(),
        vec!["progress 50", "progress 100", "hide progress", "content"]
    );
}

#[test]
fn integrity_error_should_stay_on_screen_and_lock_the_intro() {
    let (mut manager, mut received) = posting_manager();
    let (overlay, calls) = RecordingOverlay::new();
    let mut status = LoadingStatus::new(Box::new(overlay), Duration::from_secs(2));

    manager.item_start(CAKE);
    manager.item_start(CANDLE);

    // the cake fetched fine but is missing a flame node
    let mut bundle = cake_bundle_without(&["Fire3"]);
    let error = assemble(&mut bundle, &Manifest::cake()).unwrap_err();
    status.fail(&error.to_string());
    manager.item_end(CAKE, true);
    manager.item_end(CANDLE, true);
    drain(&mut received, &mut status);

    status.advance(Duration::from_secs(10));

    let calls = calls.borrow();
    assert_eq!(calls.len(), 1, "{:?}", calls);
    assert!(calls[0].starts_with("error "));
    assert!(calls[0].contains("Fire3"));
    assert!(!status.is_ready());
    assert!(status.fatal().is_some_and(|message| message.contains("Fire3")));
}

#[test]
fn late_integrity_error_should_not_be_followed_by_begin() {
    let (mut manager, mut received) = posting_manager();
    let (overlay, calls) = RecordingOverlay::new();
    let mut status = LoadingStatus::new(Box::new(overlay), Duration::from_secs(2));

    manager.item_start(CAKE);
    manager.item_end(CAKE, true);
    drain(&mut received, &mut status);
    // the reveal delay is already counting down
    status.advance(Duration::from_secs(1));
    status.fail("bundle `models/birthday.glb` is missing required node(s): Fire3");
    status.advance(Duration::from_secs(5));

    assert!(!status.is_ready());
    assert!(!calls.borrow().iter().any(|call| call == "content"));
}

#[test]
fn failed_paths_should_be_offered_for_retry() {
    let (mut manager, mut received) = posting_manager();
    let (overlay, calls) = RecordingOverlay::new();
    let mut status = LoadingStatus::new(Box::new(overlay), Duration::ZERO);

    manager.item_start(CANDLE);
    manager.item_end(CANDLE, false);
    drain(&mut received, &mut status);
    status.advance(Duration::from_secs(1));

    assert!(!status.is_ready());
    assert_eq!(
        calls.borrow().last().map(String::as_str),
        Some("retry textures/candle.jpg")
    );
    assert!(status.fatal().is_none());
}
