//! Kino Vimeo - Vimeo playback tech for Kino
//!
//! Bridges the asynchronous, event-driven Vimeo player API onto the
//! synchronous accessors and imperative commands a player framework expects
//! from a playback "tech":
//! - Readiness gating until the Vimeo client library has loaded
//! - A local playback snapshot reconciled from remote player events
//! - Deferred play intents and the muted-autoplay bootstrap
//! - Best-effort commands that never fail towards the host
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Host framework                         │
//! └───────────┬──────────────────────────────────▲───────────────┘
//!             │ commands                         │ notifications
//! ┌───────────▼──────────────────────────────────┴───────────────┐
//! │                         VimeoTech                            │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐      │
//! │  │   Snapshot   │   │   Intents    │   │    Error     │      │
//! │  └──────────────┘   └──────────────┘   └──────────────┘      │
//! └───────────┬──────────────────────────────────▲───────────────┘
//!             │ async commands                   │ remote events
//! ┌───────────▼──────────────────────────────────┴───────────────┐
//! │   ReadinessGate ──► PlayerFactory ──► RemotePlayer (Vimeo)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything runs on a single event-loop thread. Shared state is
//! reference counted with `Rc` and never crosses threads.

pub mod config;
pub mod error;
pub mod gate;
pub mod host;
pub mod remote;
pub mod runtime;
pub mod tech;
pub mod types;

pub use config::{Platform, RemotePlayerConfig, TechOptions, TechPolicy};
pub use error::{Error, RemoteError, Result, TechError};
pub use gate::{LibraryListener, ReadinessGate};
pub use host::TechHost;
pub use remote::{EventHandler, PlayerFactory, RemoteEvent, RemoteEventKind, RemotePlayer};
pub use runtime::{LocalTask, Spawner};
pub use tech::{TechEnv, VimeoTech};
pub use types::*;

#[cfg(feature = "tokio")]
pub use runtime::TokioSpawner;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name the tech registers under with the host framework
pub const TECH_NAME: &str = "Vimeo";

/// The only source type this tech can play
pub const VIMEO_MIME_TYPE: &str = "video/vimeo";

/// Vimeo player client library
pub const PLAYER_API_URL: &str = "https://player.vimeo.com/api/player.js";

/// Initialize the library
pub fn init() {
    tracing::info!(version = VERSION, "Kino Vimeo initialized");
}
