//! Mirror of the external window manager's client list.
//!
//! The stacking window manager owns policy; this module only mirrors what
//! the render manager needs to see of it: each client's type, geometry,
//! stacking position, EWMH-ish flags and the portrait properties. The
//! mirror is fed by the inbound `map` / `unmap` / `register` / `unregister`
//! / `property_changed` events and is plain data, which keeps the engines
//! that consume it trivially testable.

pub mod portrait;

use std::collections::HashMap;

use lumen_core::types::Rect;

use crate::scene::ActorId;
use portrait::PortraitFlags;

/// Handle to a client in the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u32);

/// The X window a client wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u32);

/// Subtypes of notification windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    Banner,
    Info,
    Confirmation,
    /// A full incoming-event note.
    IncomingEvent,
    /// The small preview popped up before the full note.
    IncomingEventPreview,
}

/// What role a client plays, replacing the source's type-id hierarchy with
/// a flat tag (the capability differences are small enough to match on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    Desktop,
    App,
    Dialog,
    Menu,
    AppMenu,
    StatusMenu,
    Note(NoteKind),
    HomeApplet,
    StatusArea,
}

impl ClientKind {
    /// Dialog-like clients that cause background blur when stacked above an
    /// application.
    pub fn blurs_background(self) -> bool {
        matches!(
            self,
            ClientKind::Dialog
                | ClientKind::Menu
                | ClientKind::AppMenu
                | ClientKind::StatusMenu
                | ClientKind::Note(NoteKind::Info)
                | ClientKind::Note(NoteKind::Confirmation)
        )
    }

    pub fn is_note(self) -> bool {
        matches!(self, ClientKind::Note(_))
    }
}

/// One mirrored window-manager client.
#[derive(Debug)]
pub struct Client {
    pub window: WindowId,
    pub kind: ClientKind,
    pub name: String,
    /// Window geometry in screen coordinates.
    pub geometry: Rect,
    /// Frame geometry (window plus decorations).
    pub frame_geometry: Rect,
    /// The scene actor the compositor created for this client.
    pub actor: Option<ActorId>,
    /// Virtual desktop index; `None` for clients outside the desktop cycle.
    pub desktop_index: Option<u32>,
    pub fullscreen: bool,
    /// 32-bit visual with alpha; never treated as opaque.
    pub argb32: bool,
    /// Shaped by the theme; never treated as opaque.
    pub shaped: bool,
    /// A transparent blocker window sits in front of this client's parent.
    pub has_modal_blocker: bool,
    pub has_video_overlay: bool,
    /// The client manages its own actor's stacking and visibility; the
    /// stacking synchronizer must leave it alone.
    pub self_stacking: bool,
    pub map_confirmed: bool,
    pub unmap_confirmed: bool,
    pub transient_for: Option<ClientId>,
    pub hibernable: bool,
    pub able_to_hibernate: bool,
    pub hibernating: bool,
    pub do_not_disturb: bool,
    /// The client opted into composition bypass when fullscreen.
    pub non_composited: bool,
    /// Redirection is currently off; pixels bypass the compositor.
    pub unredirected: bool,
    /// Dialog spawned by home-edit mode.
    pub home_edit_dialog: bool,
    pub portrait: PortraitFlags,
    /// Predictive portrait hint carried by the window before it maps
    /// (0 none, 1 request, >1 demand).
    pub portrait_on_map: u32,
}

impl Client {
    pub fn new(window: WindowId, kind: ClientKind) -> Self {
        Client {
            window,
            kind,
            name: String::new(),
            geometry: Rect::default(),
            frame_geometry: Rect::default(),
            actor: None,
            desktop_index: Some(0),
            fullscreen: false,
            argb32: false,
            shaped: false,
            has_modal_blocker: false,
            has_video_overlay: false,
            self_stacking: false,
            map_confirmed: false,
            unmap_confirmed: false,
            transient_for: None,
            hibernable: false,
            able_to_hibernate: false,
            hibernating: false,
            do_not_disturb: false,
            non_composited: false,
            unredirected: false,
            home_edit_dialog: false,
            portrait: PortraitFlags::default(),
            portrait_on_map: 0,
        }
    }

    /// Whether the client can be treated as an opaque occluder.
    pub fn is_opaque(&self) -> bool {
        !self.argb32 && !self.shaped
    }
}

/// The mirrored stack, bottom-to-top.
#[derive(Default)]
pub struct ClientStack {
    clients: HashMap<ClientId, Client>,
    stack: Vec<ClientId>,
    next_id: u32,
    portrait_generation: u64,
}

impl ClientStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client on top of the stack.
    pub fn insert(&mut self, client: Client) -> ClientId {
        let id = ClientId(self.next_id);
        self.next_id += 1;
        self.clients.insert(id, client);
        self.stack.push(id);
        self.bump_portrait_generation();
        id
    }

    pub fn remove(&mut self, id: ClientId) -> Option<Client> {
        self.stack.retain(|c| *c != id);
        let removed = self.clients.remove(&id);
        if removed.is_some() {
            self.bump_portrait_generation();
        }
        removed
    }

    pub fn get(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn get_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(&id)
    }

    pub fn by_window(&self, window: WindowId) -> Option<ClientId> {
        self.stack
            .iter()
            .copied()
            .find(|id| self.clients.get(id).map(|c| c.window) == Some(window))
    }

    pub fn by_actor(&self, actor: ActorId) -> Option<ClientId> {
        self.stack
            .iter()
            .copied()
            .find(|id| self.clients.get(id).and_then(|c| c.actor) == Some(actor))
    }

    /// Replace the stacking order. Ids not in `order` keep their relative
    /// position at the bottom; unknown ids are ignored.
    pub fn set_stack_order(&mut self, order: &[ClientId]) {
        let mut rest: Vec<ClientId> = self
            .stack
            .iter()
            .copied()
            .filter(|id| !order.contains(id))
            .collect();
        rest.extend(order.iter().copied().filter(|id| self.clients.contains_key(id)));
        self.stack = rest;
    }

    /// Bottom-to-top.
    pub fn bottom_up(&self) -> Vec<ClientId> {
        self.stack.clone()
    }

    /// Top-to-bottom.
    pub fn top_down(&self) -> Vec<ClientId> {
        let mut v = self.stack.clone();
        v.reverse();
        v
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn desktop(&self) -> Option<ClientId> {
        self.stack
            .iter()
            .copied()
            .find(|id| self.clients.get(id).map(|c| c.kind) == Some(ClientKind::Desktop))
    }

    /// Clients stacked above the desktop, top-to-bottom.
    pub fn above_desktop_top_down(&self) -> Vec<ClientId> {
        let desktop = self.desktop();
        let mut out = Vec::new();
        for id in self.top_down() {
            if Some(id) == desktop {
                break;
            }
            out.push(id);
        }
        out
    }

    /// Whether any mapped client carries a modal blocker.
    pub fn has_modal_blockers(&self) -> bool {
        self.stack.iter().any(|id| {
            self.clients
                .get(id)
                .map(|c| c.has_modal_blocker && c.map_confirmed && !c.unmap_confirmed)
                .unwrap_or(false)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn app(window: u32) -> Client {
        Client::new(WindowId(window), ClientKind::App)
    }

    #[test]
    fn insert_stacks_on_top() {
        let mut stack = ClientStack::new();
        let a = stack.insert(app(1));
        let b = stack.insert(app(2));
        assert_eq!(stack.bottom_up(), vec![a, b]);
        assert_eq!(stack.top_down(), vec![b, a]);
    }

    #[test]
    fn remove_drops_from_both_views() {
        let mut stack = ClientStack::new();
        let a = stack.insert(app(1));
        let b = stack.insert(app(2));
        stack.remove(a);
        assert_eq!(stack.bottom_up(), vec![b]);
        assert!(stack.get(a).is_none());
    }

    #[test]
    fn set_stack_order_reorders() {
        let mut stack = ClientStack::new();
        let a = stack.insert(app(1));
        let b = stack.insert(app(2));
        let c = stack.insert(app(3));
        stack.set_stack_order(&[c, a, b]);
        assert_eq!(stack.bottom_up(), vec![c, a, b]);
    }

    #[test]
    fn above_desktop_stops_at_the_desktop() {
        let mut stack = ClientStack::new();
        let below = stack.insert(app(1));
        let _desktop = stack.insert(Client::new(WindowId(2), ClientKind::Desktop));
        let above = stack.insert(app(3));
        let tops = stack.above_desktop_top_down();
        assert_eq!(tops, vec![above]);
        assert!(!tops.contains(&below));
    }

    #[test]
    fn modal_blockers_require_a_mapped_client() {
        let mut stack = ClientStack::new();
        let id = stack.insert(Client::new(WindowId(1), ClientKind::Dialog));
        stack.get_mut(id).unwrap().has_modal_blocker = true;
        assert!(!stack.has_modal_blockers());
        stack.get_mut(id).unwrap().map_confirmed = true;
        assert!(stack.has_modal_blockers());
    }

    #[test]
    fn opaque_requires_no_alpha_and_no_shape() {
        let mut c = app(1);
        assert!(c.is_opaque());
        c.argb32 = true;
        assert!(!c.is_opaque());
        c.argb32 = false;
        c.shaped = true;
        assert!(!c.is_opaque());
    }
}
