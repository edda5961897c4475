//! Shared fixture for the render-manager integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use lumen_core::types::{Rect, Size};
use lumen_system::config::TransitionConfig;
use lumen_system::render::{RenderManager, State, TimeMs};
use lumen_system::wm::{Client, ClientId, ClientKind, WindowId};
use lumen_system::xserver::mock::{MockState, MockXConnection};

pub const SCREEN_W: i32 = 800;
pub const SCREEN_H: i32 = 480;

pub struct Fixture {
    pub rm: RenderManager,
    pub server: Rc<RefCell<MockState>>,
    pub now: TimeMs,
    pub desktop: ClientId,
    next_window: u32,
}

impl Fixture {
    /// A manager with a mapped desktop, settled in the `Home` state.
    pub fn new() -> Self {
        let (conn, server) = MockXConnection::new();
        let mut rm = RenderManager::new(
            Box::new(conn),
            TransitionConfig::default(),
            Size::new(SCREEN_W, SCREEN_H),
        );
        rm.set_start_stamp_path(None);

        let mut desktop = Client::new(WindowId(1), ClientKind::Desktop);
        desktop.geometry = Rect::new(0, 0, SCREEN_W, SCREEN_H);
        desktop.frame_geometry = desktop.geometry;
        let desktop = rm.client_registered(desktop);
        rm.client_mapped(desktop);
        rm.set_state(State::Home);

        let mut fixture = Fixture {
            rm,
            server,
            now: 0,
            desktop,
            next_window: 100,
        };
        fixture.settle();
        fixture
    }

    /// Advance the clock and run deferred work once.
    pub fn tick(&mut self, ms: TimeMs) {
        self.now += ms;
        self.rm.dispatch(self.now);
    }

    /// Run until any transition and deferred work has finished.
    pub fn settle(&mut self) {
        for _ in 0..40 {
            self.tick(16);
        }
    }

    fn next_window(&mut self) -> WindowId {
        self.next_window += 1;
        WindowId(self.next_window)
    }

    /// Register and map a client of `kind` with `geometry`.
    pub fn add_client(&mut self, kind: ClientKind, geometry: Rect) -> ClientId {
        let window = self.next_window();
        let mut client = Client::new(window, kind);
        client.geometry = geometry;
        client.frame_geometry = geometry;
        let id = self.rm.client_registered(client);
        self.rm.client_mapped(id);
        self.tick(16);
        id
    }

    /// A fullscreen-geometry application client.
    pub fn add_app(&mut self) -> ClientId {
        self.add_client(ClientKind::App, Rect::new(0, 0, SCREEN_W, SCREEN_H))
    }

    /// A normal application: full-screen frame, window below the title bar.
    pub fn add_windowed_app(&mut self) -> ClientId {
        let window = self.next_window();
        let mut client = Client::new(window, ClientKind::App);
        client.geometry = Rect::new(0, 56, SCREEN_W, SCREEN_H - 56);
        client.frame_geometry = Rect::new(0, 0, SCREEN_W, SCREEN_H);
        let id = self.rm.client_registered(client);
        self.rm.client_mapped(id);
        self.tick(16);
        id
    }

    /// Subscribe a counter to the transition-complete channel.
    pub fn count_transition_completes(&mut self) -> Rc<RefCell<u32>> {
        let count = Rc::new(RefCell::new(0));
        let inner = count.clone();
        self.rm
            .signals()
            .transition_complete
            .subscribe("test-counter", move |_| *inner.borrow_mut() += 1);
        count
    }
}
