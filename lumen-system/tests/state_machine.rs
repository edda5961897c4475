//! State machine behavior: transitions, redirections, re-entrancy and the
//! scene-group invariants that must hold after every public call.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::Fixture;
use lumen_core::types::Rotation;
use lumen_system::render::state::BlurFlags;
use lumen_system::render::title_bar::TitleBarFlags;
use lumen_system::render::State;
use lumen_system::ShellHandle;

fn stage_order_is_sane(f: &Fixture) {
    let groups = *f.rm.groups();
    let children = f.rm.scene().children(f.rm.scene().stage());
    let position = |actor| children.iter().position(|c| *c == actor).unwrap();
    assert!(position(groups.home_blur) < position(groups.task_nav));
    assert!(position(groups.task_nav) < position(groups.launcher));
    assert!(position(groups.launcher) < position(groups.app_top));
    assert!(position(groups.app_top) < position(groups.front));
}

#[test]
fn entering_the_current_state_is_a_noop() {
    let mut f = Fixture::new();
    let changes = Rc::new(RefCell::new(0));
    let counter = changes.clone();
    f.rm
        .signals()
        .state_changed
        .subscribe("count", move |_| *counter.borrow_mut() += 1);

    f.rm.set_state(State::Home);
    f.settle();
    assert_eq!(*changes.borrow(), 0);
    assert_eq!(f.rm.state(), State::Home);
}

#[test]
fn task_nav_with_an_empty_navigator_redirects_home() {
    let mut f = Fixture::new();
    let completes = f.count_transition_completes();

    f.rm.set_state(State::TaskNav);
    f.settle();

    assert_eq!(f.rm.state(), State::Home);
    assert!(f
        .rm
        .title_bar()
        .flags()
        .contains(TitleBarFlags::BTN_LAUNCHER));
    assert_eq!(f.rm.rotation(), Rotation::Rotate0);
    assert_eq!(*completes.borrow(), 0);
}

#[test]
fn home_to_app_with_a_maximized_client() {
    let mut f = Fixture::new();
    f.add_app();
    f.settle();
    let completes = f.count_transition_completes();

    f.rm.set_state(State::App);

    assert!(!f.rm.scene().is_visible(f.rm.groups().home));
    assert!(f
        .rm
        .title_bar()
        .flags()
        .contains(TitleBarFlags::BTN_SWITCHER));
    assert_eq!(f.rm.current_blur(), BlurFlags::empty());

    f.settle();
    assert_eq!(*completes.borrow(), 1);
    stage_order_is_sane(&f);
}

#[test]
fn rapid_state_changes_settle_on_the_last_target() {
    let mut f = Fixture::new();
    f.add_app();
    f.settle();
    f.rm.set_state(State::App);
    f.settle();

    let completes = f.count_transition_completes();

    f.rm.set_state(State::TaskNav);
    f.tick(16);
    assert!(f.rm.in_transition());
    f.rm.set_state(State::Launcher);
    f.tick(16);
    f.rm.set_state(State::Home);
    f.settle();

    assert_eq!(f.rm.state(), State::Home);
    // The interrupted transitions never completed; only the last did.
    assert_eq!(*completes.borrow(), 1);

    let params = f.rm.blur_params();
    assert_eq!(params.home_radius.target(), 0.0);
    assert_eq!(params.home_saturation.target(), 1.0);
    assert_eq!(params.home_brightness.target(), 1.0);
    assert_eq!(params.home_zoom.target(), 1.0);
    assert_eq!(params.task_nav_opacity.target(), 0.0);
    assert_eq!(params.home_radius.current(), 0.0);

    // The title-bar layer ends up back inside the blur group.
    assert_eq!(
        f.rm.scene().parent(f.rm.groups().blur_front),
        Some(f.rm.groups().home_blur)
    );
    stage_order_is_sane(&f);
}

#[test]
fn interrupted_ranges_stay_on_their_segment() {
    let mut f = Fixture::new();
    f.add_app();
    f.settle();
    f.rm.set_state(State::App);
    f.settle();

    f.rm.set_state(State::TaskNav);
    for _ in 0..4 {
        f.tick(16);
        let params = f.rm.blur_params();
        for range in [
            params.home_radius,
            params.home_saturation,
            params.home_brightness,
            params.home_zoom,
            params.task_nav_opacity,
            params.task_nav_zoom,
            params.applets_opacity,
            params.applets_zoom,
        ] {
            let (lo, hi) = if range.start() <= range.target() {
                (range.start(), range.target())
            } else {
                (range.target(), range.start())
            };
            assert!(range.current() >= lo && range.current() <= hi);
        }
    }
}

#[test]
fn set_state_emits_exactly_one_change_per_transition() {
    let mut f = Fixture::new();
    f.add_app();
    f.settle();
    let changes = Rc::new(RefCell::new(Vec::new()));
    let log = changes.clone();
    f.rm
        .signals()
        .state_changed
        .subscribe("log", move |s| log.borrow_mut().push(*s));

    f.rm.set_state(State::App);
    f.rm.set_state(State::App);
    f.settle();

    assert_eq!(*changes.borrow(), vec![State::App]);
}

#[test]
fn portrait_round_trip_returns_to_the_same_state() {
    let mut f = Fixture::new();
    f.add_app();
    f.settle();

    f.rm.set_state(State::App);
    f.settle();
    f.rm.set_state_portrait();
    assert_eq!(f.rm.state(), State::AppPortrait);
    f.rm.set_state_unportrait();
    assert_eq!(f.rm.state(), State::App);
    assert_eq!(f.rm.rotation(), Rotation::Rotate0);

    f.rm.set_state(State::Home);
    f.settle();
    f.rm.set_state_portrait();
    assert_eq!(f.rm.state(), State::HomePortrait);
    f.rm.set_state_unportrait();
    assert_eq!(f.rm.state(), State::Home);
}

#[test]
fn portrait_lift_is_refused_outside_capable_states() {
    let mut f = Fixture::new();
    f.rm.set_state(State::Launcher);
    f.settle();
    f.rm.set_state_portrait();
    assert_eq!(f.rm.state(), State::Launcher);
    f.rm.set_state_unportrait();
    assert_eq!(f.rm.state(), State::Launcher);
}

#[test]
fn blur_front_and_home_front_follow_their_invariants() {
    let mut f = Fixture::new();
    let groups = *f.rm.groups();

    // Home: buttons blur with the content, applets ride in front.
    assert_eq!(f.rm.scene().parent(groups.blur_front), Some(groups.home_blur));
    assert_eq!(f.rm.scene().parent(groups.home_front), Some(groups.blur_front));

    // The launcher blurs home but keeps the bar crisp: lifted to the stage,
    // applets back with the desktop.
    f.rm.set_state(State::Launcher);
    f.settle();
    assert_eq!(
        f.rm.scene().parent(groups.blur_front),
        Some(f.rm.scene().stage())
    );
    assert_eq!(f.rm.scene().parent(groups.home_front), Some(groups.home));

    // And back.
    f.rm.set_state(State::Home);
    f.settle();
    assert_eq!(f.rm.scene().parent(groups.blur_front), Some(groups.home_blur));
    assert_eq!(f.rm.scene().parent(groups.home_front), Some(groups.blur_front));
}

#[test]
fn reentrant_state_change_from_a_notification_is_ignored() {
    let f = Fixture::new();
    let handle = ShellHandle::new(f.rm);
    let nested = handle.clone();
    handle.with(|m| {
        m.signals().state_changed.subscribe("reenter", move |_| {
            // Mirrors a notification handler trying to change state again
            // while the first change is still being applied.
            nested.set_state(State::Launcher);
        });
    });

    handle.set_state(State::App);
    assert_eq!(handle.state(), Some(State::App));
}
