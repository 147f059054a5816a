//! Hexreign - simulation core of a tick-based hex strategy game
//!
//! This crate provides the deterministic game logic, including:
//! - Procedural world generation from hashed hex coordinates
//! - Hex geometry: distance, radius enumeration, reachability, targeting
//! - An action queue gated by a regenerating action-point budget
//! - A tick resolver applying queued actions in a fixed priority order
//! - Combat resolution and the advisor mood state machine
//!
//! # Architecture
//!
//! All state lives in a [`WorldStore`]. The [`Game`] facade wraps it with the
//! operations a submission layer and a scheduler need. The crate never reads
//! the wall clock: every operation that records time takes a [`Timestamp`].
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates and geometry
//! - [`world`]: Pure terrain and deposit generation
//! - [`player`], [`unit`], [`tile`]: Entity records
//! - [`actions`]: Queued actions and logged events
//! - [`store`]: In-memory entity store
//! - [`queue`]: Submission and cancellation
//! - [`tick`]: Tick resolution
//! - [`combat`]: Attack resolution
//! - [`advisor`]: Advisors and mood
//! - [`game`]: The facade

pub mod actions;
pub mod advisor;
pub mod combat;
pub mod config;
pub mod game;
pub mod hex;
pub mod player;
pub mod queue;
pub mod store;
pub mod tick;
pub mod tile;
pub mod unit;
pub mod world;

/// Milliseconds since the Unix epoch
pub type Timestamp = u64;

// Re-export commonly used types
pub use actions::{ActionId, ActionKind, ActionRequest, ActionStatus, Event, EventId, EventKind, Outcome, PendingAction};
pub use advisor::{Advisor, AdvisorProfile, Archetype, Mood};
pub use config::{GameConfig, GameConfigError};
pub use game::{Game, NewPlayer};
pub use hex::HexCoord;
pub use player::{Player, PlayerId, PlayerStatus, ResourceDelta, ResourceKind, Resources};
pub use queue::QueueError;
pub use store::{StoreError, UnitFilter, WorldStore};
pub use tick::{TickError, TickOutcome, TickRecord, TickSummary};
pub use tile::{Improvement, Tile};
pub use unit::{Unit, UnitId, UnitKind, UnitStatus};
pub use world::{Deposit, Terrain};
