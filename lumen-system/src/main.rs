//! The Lumen shell driver.
//!
//! Loads configuration, initializes logging and runs the render manager on
//! a calloop event loop. Without a display server to talk to this binary
//! drives the headless backend, which is enough to exercise the whole
//! state machine; the real compositor embeds [`lumen_system`] as a library
//! and supplies its own `XConnection`.

use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;

use lumen_core::config::ConfigLoader;
use lumen_core::logging;
use lumen_core::types::{Rect, Size};
use lumen_system::config::TransitionConfig;
use lumen_system::render::{RenderManager, State};
use lumen_system::wm::{Client, ClientKind, WindowId};
use lumen_system::xserver::mock::MockXConnection;
use lumen_system::{ShellHandle, SystemError};

/// Frame pacing of the deferred-work timer.
const TICK: Duration = Duration::from_millis(16);

const SCREEN: Size<i32> = Size {
    width: 800,
    height: 480,
};

fn main() -> Result<(), SystemError> {
    let core_config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(e) => {
            logging::init_minimal_logging();
            tracing::warn!(error = %e, "configuration failed to load, using defaults");
            Default::default()
        }
    };
    if let Err(e) = logging::init_logging(&core_config.logging) {
        logging::init_minimal_logging();
        tracing::warn!(error = %e, "falling back to minimal logging");
    }

    let transitions = TransitionConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "transitions failed to load, using defaults");
        TransitionConfig::default()
    });

    let (connection, _server_state) = MockXConnection::new();
    let mut manager = RenderManager::new(Box::new(connection), transitions, SCREEN);

    // Seed the desktop the window manager would hand us on startup.
    let mut desktop = Client::new(WindowId(1), ClientKind::Desktop);
    desktop.geometry = Rect::from_size(SCREEN);
    desktop.frame_geometry = desktop.geometry;
    let desktop_id = manager.client_registered(desktop);
    manager.client_mapped(desktop_id);
    manager.set_state(State::Home);

    let handle = ShellHandle::new(manager);

    let mut event_loop: EventLoop<ShellHandle> =
        EventLoop::try_new().map_err(|e| SystemError::EventLoop(e.to_string()))?;

    let started = Instant::now();
    event_loop
        .handle()
        .insert_source(Timer::from_duration(TICK), move |_deadline, _, shell| {
            let now = started.elapsed().as_millis() as u64;
            shell.dispatch(now);
            TimeoutAction::ToDuration(TICK)
        })
        .map_err(|e| SystemError::EventLoop(e.to_string()))?;

    tracing::info!("lumen shell running");
    event_loop
        .run(None, &mut handle.clone(), |_| {})
        .map_err(|e| SystemError::EventLoop(e.to_string()))?;

    Ok(())
}
