//! Render and state manager for the Lumen mobile compositing shell.
//!
//! This crate sits between a stacking window manager (which owns window
//! policy and feeds us map/unmap/restack and property events) and a
//! scene-graph renderer (which owns pixels). It decides, at any instant:
//!
//! - which layer is visible: home, home edit, application, task navigator,
//!   launcher or loading screen, and in which orientation;
//! - how the home layer is blurred, dimmed and zoomed, driven by an
//!   interpolated transition between discrete states;
//! - which screen regions accept pointer input at the display-server level;
//! - whether compositing can be bypassed entirely for a fullscreen opaque
//!   client.
//!
//! The central type is [`render::RenderManager`]; [`handle::ShellHandle`]
//! wraps it for use from event callbacks. All state lives on one thread and
//! deferred work (viewport flushes, blocker timeouts, timeline frames) is
//! driven by calling [`render::RenderManager::dispatch`] from the event
//! loop.

pub mod comp;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod render;
pub mod scene;
pub mod wm;
pub mod xserver;

pub use error::SystemError;
pub use handle::ShellHandle;
pub use render::RenderManager;
