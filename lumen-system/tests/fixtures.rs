//! Borrowed fixtures: the loading image and hibernated application actors.

mod common;

use common::Fixture;
use lumen_core::types::Rect;
use lumen_system::render::State;
use lumen_system::wm::{Client, ClientKind, WindowId};

#[test]
fn loading_image_is_borrowed_and_returned() {
    let mut f = Fixture::new();
    let image = f.rm.scene_mut().create_actor("loading-image");
    let front = f.rm.groups().front;
    f.rm.scene_mut().reparent(image, front);

    f.rm.set_loading(Some(image));
    f.rm.set_state(State::Loading);
    f.settle();

    // Borrowed into the crisp layer. An image borrowed from another group
    // keeps the top of the screen; the transition frame places it.
    assert_eq!(f.rm.scene().parent(image), Some(f.rm.groups().blur_front));
    assert_eq!(f.rm.scene().geometry(image), Rect::new(0, 0, 800, 424));

    f.rm.set_state(State::Home);
    f.settle();

    // Returned to where it came from.
    assert_eq!(f.rm.scene().parent(image), Some(front));
}

#[test]
fn orphaned_loading_image_is_unparented_on_exit() {
    let mut f = Fixture::new();
    let image = f.rm.scene_mut().create_actor("loading-image");

    f.rm.set_loading(Some(image));
    f.rm.set_state(State::Loading);
    f.settle();
    assert_eq!(f.rm.scene().parent(image), Some(f.rm.groups().blur_front));

    f.rm.set_state(State::Home);
    f.settle();
    assert_eq!(f.rm.scene().parent(image), None);
}

#[test]
fn hibernated_app_actor_is_pinned_until_it_returns() {
    let mut f = Fixture::new();

    let mut client = Client::new(WindowId(300), ClientKind::App);
    client.geometry = Rect::new(0, 0, 800, 480);
    client.frame_geometry = client.geometry;
    client.name = "maps".into();
    client.able_to_hibernate = true;
    let id = f.rm.client_registered(client);
    f.rm.client_mapped(id);
    f.settle();
    let actor = f.rm.clients().get(id).unwrap().actor.unwrap();

    f.rm.client_unmapped(id);
    f.rm.client_unregistered(id);
    f.settle();

    // The actor outlives its client while the app hibernates.
    assert!(f.rm.scene().contains(actor));
    assert!(!f.rm.scene().is_visible(actor));

    // The app comes back: the pinned actor is released.
    let mut revived = Client::new(WindowId(301), ClientKind::App);
    revived.geometry = Rect::new(0, 0, 800, 480);
    revived.frame_geometry = revived.geometry;
    revived.name = "maps".into();
    let id = f.rm.client_registered(revived);
    f.rm.client_mapped(id);
    f.settle();

    assert!(!f.rm.scene().contains(actor));
    assert!(f.rm.clients().get(id).unwrap().actor.is_some());
}

#[test]
fn stage_zoom_holds_the_input_blocker_until_unzoom() {
    let mut f = Fixture::new();
    f.rm.zoom_in();
    assert!(f.rm.is_zoomed());
    assert!(f.rm.has_input_blocker());
    // While zoomed, events pass through to the zoom gesture handlers.
    assert!(!f.rm.captured_event());

    // No timeout applies while the zoom holds the blocker.
    f.tick(2000);
    assert!(f.rm.has_input_blocker());

    f.rm.unzoom();
    assert!(!f.rm.is_zoomed());
    assert!(!f.rm.has_input_blocker());
}

#[test]
fn plain_unregister_destroys_the_actor() {
    let mut f = Fixture::new();
    let id = f.add_app();
    let actor = f.rm.clients().get(id).unwrap().actor.unwrap();

    f.rm.client_unmapped(id);
    f.rm.client_unregistered(id);

    assert!(!f.rm.scene().contains(actor));
}
