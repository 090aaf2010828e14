use cake_scene::{
    cancel::CancellationToken,
    frame::{Delay, FrameClock},
};
use instant::{Duration, Instant};

#[test]
fn elapsed_time_should_never_decrease() {
    let mut clock = FrameClock::new();
    let t0 = Instant::now();

    let first = clock.tick_at(t0);
    assert_eq!(first.elapsed, Duration::ZERO);
    assert_eq!(first.delta, Duration::ZERO);

    let second = clock.tick_at(t0 + Duration::from_millis(16));
    assert_eq!(second.elapsed, Duration::from_millis(16));
    assert_eq!(second.delta, Duration::from_millis(16));

    // an out-of-order instant counts as no time passing
    let third = clock.tick_at(t0 + Duration::from_millis(5));
    assert_eq!(third.elapsed, Duration::from_millis(16));
    assert_eq!(third.delta, Duration::ZERO);

    let fourth = clock.tick_at(t0 + Duration::from_millis(40));
    assert_eq!(fourth.elapsed, Duration::from_millis(40));
    assert_eq!(fourth.delta, Duration::from_millis(24));
}

#[test]
fn real_ticks_should_be_monotonic() {
    let mut clock = FrameClock::new();
    let mut last = Duration::ZERO;
    for _ in 0..100 {
        let frame = clock.tick();
        assert!(frame.elapsed >= last);
        last = frame.elapsed;
    }
}

#[test]
fn delay_should_fire_exactly_once() {
    let mut delay = Delay::new(Duration::from_secs(2));
    assert!(!delay.advance(Duration::from_millis(1500)));
    assert!(!delay.has_fired());
    assert!(delay.advance(Duration::from_millis(600)));
    assert!(delay.has_fired());
    assert!(!delay.advance(Duration::from_secs(10)));
}

#[test]
fn zero_delay_should_fire_on_first_advance() {
    let mut delay = Delay::new(Duration::ZERO);
    assert!(delay.advance(Duration::ZERO));
}

#[test]
fn cancellation_should_be_seen_by_every_clone() {
    let token = CancellationToken::new();
    let observer = token.clone();
    assert!(!observer.is_cancelled());
    token.cancel();
    assert!(observer.is_cancelled());
}
