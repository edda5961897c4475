//! Composition bypass and the blur-state stacking scan.

mod common;

use common::{Fixture, SCREEN_H, SCREEN_W};
use lumen_core::types::Rect;
use lumen_system::comp::PropertyEvent;
use lumen_system::render::state::BlurFlags;
use lumen_system::render::title_bar::TitleBarFlags;
use lumen_system::render::State;
use lumen_system::wm::ClientKind;
use lumen_system::xserver::mock::MockCall;

#[test]
fn fullscreen_opt_in_client_enters_bypass_and_a_dialog_leaves_it() {
    let mut f = Fixture::new();
    let app = f.add_app();
    f.rm.clients_mut().get_mut(app).unwrap().fullscreen = true;
    let window = f.rm.clients().get(app).unwrap().window;

    f.rm.set_state(State::App);
    f.settle();

    f.rm.property_changed(window, PropertyEvent::NonCompositedWindow(Some(1)));

    // Bypass: overlay released, stage parked off screen, app unredirected.
    assert_eq!(f.rm.state(), State::NonComposited);
    assert!(!f.rm.compositing_enabled());
    {
        let server = f.server.borrow();
        assert!(server.overlay.is_none());
        assert_eq!(server.redirected_off, vec![window]);
        assert_eq!(server.stage_position, (0, -SCREEN_H));
        assert!(server.calls_of(|c| *c == MockCall::ReleaseOverlay) > 0);
    }

    // A dialog mapping above needs compositing back.
    let dialog = f.add_client(ClientKind::Dialog, Rect::new(100, 100, 400, 200));
    f.settle();

    assert_eq!(f.rm.state(), State::App);
    assert!(f.rm.compositing_enabled());
    {
        let server = f.server.borrow();
        assert!(server.overlay.is_some());
        assert!(server.redirected_off.is_empty());
        assert_eq!(server.stage_position, (0, 0));
    }

    // The dialog renders in the unblurred overlay group, above the app.
    let dialog_actor = f.rm.clients().get(dialog).unwrap().actor.unwrap();
    assert_eq!(f.rm.scene().parent(dialog_actor), Some(f.rm.groups().app_top));
    let app_actor = f.rm.clients().get(app).unwrap().actor.unwrap();
    assert_eq!(f.rm.scene().parent(app_actor), Some(f.rm.groups().home_blur));
}

#[test]
fn leaving_an_app_for_home_leaves_bypass() {
    let mut f = Fixture::new();
    let app = f.add_app();
    f.rm.clients_mut().get_mut(app).unwrap().fullscreen = true;
    f.rm.clients_mut().get_mut(app).unwrap().non_composited = true;
    f.rm.set_state(State::App);
    f.settle();
    f.rm.reconsider_compositing();
    assert_eq!(f.rm.state(), State::NonComposited);

    // The application goes away; the desktop is what remains.
    f.rm.client_unmapped(app);
    f.rm.client_unregistered(app);

    assert_eq!(f.rm.state(), State::Home);
    assert!(f.rm.compositing_enabled());
}

#[test]
fn dialog_over_an_app_blurs_the_background() {
    let mut f = Fixture::new();
    let app = f.add_windowed_app();
    f.rm.set_state(State::App);
    f.settle();

    f.add_client(ClientKind::Dialog, Rect::new(100, 100, 400, 200));
    f.settle();

    assert!(f.rm.current_blur().contains(BlurFlags::BLUR_BACKGROUND));
    assert!(f.rm.title_bar().flags().contains(TitleBarFlags::FOREGROUND));
    assert!(!f.rm.blur_effect().chequer);

    // A video overlay under the dialog forbids real blur; the dim pattern
    // takes over.
    f.rm.clients_mut().get_mut(app).unwrap().has_video_overlay = true;
    f.rm.restack();
    assert!(!f.rm.current_blur().contains(BlurFlags::BLUR_BACKGROUND));
    assert!(f.rm.blur_effect().chequer);
}

#[test]
fn modal_blocked_dialog_blurs_the_buttons_too() {
    let mut f = Fixture::new();
    f.add_windowed_app();
    f.rm.set_state(State::App);
    f.settle();

    let dialog = f.add_client(ClientKind::Dialog, Rect::new(100, 100, 400, 200));
    f.rm.clients_mut().get_mut(dialog).unwrap().has_modal_blocker = true;
    f.rm.restack();

    // Background blurs, but the title-bar foreground stays down: the
    // blocker owns the whole screen anyway.
    assert!(f.rm.current_blur().contains(BlurFlags::BLUR_BACKGROUND));
    assert!(!f.rm.title_bar().flags().contains(TitleBarFlags::FOREGROUND));
}

#[test]
fn maximized_dialog_in_home_edit_dialog_state_stays_crisp() {
    let mut f = Fixture::new();
    f.rm.set_state(State::HomeEdit);
    f.settle();
    f.rm.set_state(State::HomeEditDialog);
    f.settle();

    let dialog = f.add_client(ClientKind::Dialog, Rect::new(0, 0, SCREEN_W, SCREEN_H));
    f.rm.clients_mut().get_mut(dialog).unwrap().home_edit_dialog = true;
    f.settle();

    // Maximized, but forced into the unblurred overlay so the blurred
    // background shows through behind it.
    let actor = f.rm.clients().get(dialog).unwrap().actor.unwrap();
    assert_eq!(f.rm.scene().parent(actor), Some(f.rm.groups().app_top));

    // Leaving the state deletes the dialog.
    let window = f.rm.clients().get(dialog).unwrap().window;
    f.rm.set_state(State::Home);
    let deletes = f
        .server
        .borrow()
        .calls_of(|c| *c == MockCall::DeliverDelete(window));
    assert!(deletes > 0);
}
