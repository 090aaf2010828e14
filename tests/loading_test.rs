use std::{cell::RefCell, rc::Rc};

use cake_scene::{
    config::SceneConfig,
    experience::{BundleKind, Request},
    materials::TextureKey,
    resources::loader::{LoadingManager, progress_percent},
};

#[derive(Default)]
struct Recorded {
    progress: Vec<u32>,
    completions: Vec<Vec<String>>,
}

fn recording_manager() -> (LoadingManager, Rc<RefCell<Recorded>>) {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let on_complete = recorded.clone();
    let on_progress = recorded.clone();
    let manager = LoadingManager::new(
        move |failed| on_complete.borrow_mut().completions.push(failed.to_vec()),
        move |loaded, total| {
            on_progress
                .borrow_mut()
                .progress
                .push(progress_percent(loaded, total))
        },
    );
    (manager, recorded)
}

#[test]
fn steps_should_report_rounded_percentages_and_complete_once() {
    let (mut manager, recorded) = recording_manager();
    manager.step(3, 10);
    manager.step(7, 10);
    manager.step(10, 10);
    // a repeated final step must not complete again
    manager.step(10, 10);

    let recorded = recorded.borrow();
    assert_eq!(recorded.progress, vec![30, 70, 100, 100]);
    assert_eq!(recorded.completions.len(), 1);
    assert!(manager.is_complete());
    assert_eq!(manager.percent(), 100);
}

#[test]
fn percent_should_round_to_the_nearest_integer() {
    assert_eq!(progress_percent(1, 3), 33);
    assert_eq!(progress_percent(2, 3), 67);
    assert_eq!(progress_percent(0, 12), 0);
    assert_eq!(progress_percent(0, 0), 0);
}

#[test]
fn failed_items_should_still_advance_the_bar() {
    let (mut manager, recorded) = recording_manager();
    for path in ["a.jpg", "b.glb", "c.mp3", "d.png"] {
        manager.item_start(path);
    }
    manager.item_end("a.jpg", true);
    manager.item_end("b.glb", false);
    manager.item_end("c.mp3", true);
    assert!(recorded.borrow().completions.is_empty());
    manager.item_end("d.png", true);

    let recorded = recorded.borrow();
    assert_eq!(recorded.progress, vec![25, 50, 75, 100]);
    assert_eq!(recorded.completions, vec![vec!["b.glb".to_string()]]);
    assert_eq!(manager.failed(), ["b.glb".to_string()]);
}

#[test]
fn retried_items_should_complete_the_new_total() {
    let (mut manager, recorded) = recording_manager();
    manager.item_start("a.jpg");
    manager.item_start("b.glb");
    manager.item_end("a.jpg", true);
    manager.item_end("b.glb", false);

    let failed = manager.take_failed();
    assert_eq!(failed, vec!["b.glb".to_string()]);
    assert!(manager.failed().is_empty());

    for path in &failed {
        manager.item_start(path);
    }
    assert!(!manager.is_complete());
    manager.item_end("b.glb", true);

    let recorded = recorded.borrow();
    assert_eq!(recorded.completions.len(), 2);
    assert!(recorded.completions[1].is_empty());
    assert_eq!(manager.percent(), 100);
}

#[test]
fn every_request_should_map_back_from_its_path() {
    let config = SceneConfig::default();
    let requests = Request::all();
    // two models, every texture and the song
    assert_eq!(requests.len(), 2 + TextureKey::ALL.len() + 1);

    for request in requests {
        let path = request.path(&config);
        assert_eq!(Request::from_path(path, &config), Some(request), "{}", path);
    }
    assert_eq!(
        Request::from_path("particle/particle.glb", &config),
        Some(Request::Model(BundleKind::Particles))
    );
    assert_eq!(Request::from_path("textures/unknown.png", &config), None);
}
