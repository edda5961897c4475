//! Input-viewport assembly, its deferred flush, occlusion-driven hiding
//! and the input blocker's life cycle.

mod common;

use common::{Fixture, SCREEN_H, SCREEN_W};
use lumen_core::types::Rect;
use lumen_system::render::State;
use lumen_system::wm::ClientKind;
use lumen_system::xserver::mock::STAGE_WINDOW;
use lumen_system::xserver::Region;

#[test]
fn home_claims_exactly_the_left_button() {
    let mut f = Fixture::new();
    let expected = Region::from_rect(Rect::new(0, 0, 112, 56));
    assert_eq!(f.rm.current_input_viewport(), Some(&expected));
    // The flush ran: nothing is pending and the server region matches.
    assert!(f.rm.pending_input_viewport().is_none());
    let server = f.server.borrow();
    assert_eq!(server.input_shape(STAGE_WINDOW), Some(&expected.to_wire()));
}

#[test]
fn launcher_claims_the_whole_screen() {
    let mut f = Fixture::new();
    f.rm.set_state(State::Launcher);
    f.settle();
    let expected = Region::from_rect(Rect::new(0, 0, SCREEN_W, SCREEN_H));
    assert_eq!(f.rm.current_input_viewport(), Some(&expected));
}

#[test]
fn whole_screen_claim_releases_foreground_notes() {
    let mut f = Fixture::new();
    f.rm.set_state(State::Launcher);
    f.settle();

    let note = Rect::new(200, 150, 400, 180);
    f.add_client(ClientKind::Dialog, note);
    f.rm.set_input_viewport();
    f.settle();

    let current = f.rm.current_input_viewport().unwrap();
    // The dialog's rectangle is carved out of the claim so the dialog's
    // own window receives the events.
    assert!(!current.contains_rect(note));
    assert!(current.contains_rect(Rect::new(0, 0, SCREEN_W, 150)));
}

#[test]
fn modal_blocker_empties_the_claim() {
    let mut f = Fixture::new();
    let dialog = f.add_client(ClientKind::Dialog, Rect::new(100, 100, 400, 200));
    f.rm.clients_mut().get_mut(dialog).unwrap().has_modal_blocker = true;
    f.rm.set_input_viewport();
    f.settle();

    assert!(f.rm.current_input_viewport().unwrap().is_empty());
}

#[test]
fn input_blocker_expires_after_a_second() {
    let mut f = Fixture::new();
    let before = f.rm.current_input_viewport().cloned().unwrap();

    f.rm.add_input_blocker();
    f.tick(16);
    assert!(f.rm.has_input_blocker());
    assert!(f.rm.captured_event());
    let whole = Region::from_rect(Rect::new(0, 0, SCREEN_W, SCREEN_H));
    assert_eq!(f.rm.current_input_viewport(), Some(&whole));

    // No window arrives within the second.
    f.tick(1100);
    f.tick(16);

    assert!(!f.rm.has_input_blocker());
    assert!(!f.rm.captured_event());
    assert_eq!(f.rm.current_input_viewport(), Some(&before));
}

#[test]
fn a_mapped_window_releases_the_blocker_early() {
    let mut f = Fixture::new();
    f.rm.add_input_blocker();
    f.tick(16);
    assert!(f.rm.has_input_blocker());

    f.add_app();
    assert!(!f.rm.has_input_blocker());
}

#[test]
fn covered_actors_are_hidden() {
    let mut f = Fixture::new();
    let app = f.add_app();
    f.settle();

    // The maximized application covers the desktop actor entirely.
    let app_actor = f.rm.clients().get(app).unwrap().actor.unwrap();
    assert!(f.rm.scene().is_visible(app_actor));
    assert!(!f.rm.scene().is_visible(f.rm.groups().home));
}

#[test]
fn fullscreen_app_parks_the_status_area_offscreen() {
    let mut f = Fixture::new();
    let sa = f.add_client(ClientKind::StatusArea, Rect::new(112, 0, 200, 56));
    let sa_actor = f.rm.clients().get(sa).unwrap().actor.unwrap();
    f.rm.set_status_area(Some((sa_actor, sa)));
    let app = f.add_app();
    f.settle();

    f.rm.clients_mut().get_mut(app).unwrap().fullscreen = true;
    f.rm.set_visibilities();

    assert!(!f.rm.scene().is_visible(f.rm.groups().blur_front));
    assert_eq!(f.rm.clients().get(sa).unwrap().frame_geometry.y, -56);

    f.rm.clients_mut().get_mut(app).unwrap().fullscreen = false;
    f.rm.set_visibilities();

    assert!(f.rm.scene().is_visible(f.rm.groups().blur_front));
    assert_eq!(f.rm.clients().get(sa).unwrap().frame_geometry.y, 0);
    // The reflow keeps the status area after the left button.
    assert_eq!(f.rm.clients().get(sa).unwrap().frame_geometry.x, 112);
}
