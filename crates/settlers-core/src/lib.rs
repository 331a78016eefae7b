//! Settlers - a rules engine for a hex-grid settlement-building game
//!
//! This crate provides the core game logic, including:
//! - The fixed 19-tile board with its corner lattice, tokens and ports
//! - Player ledgers, resource hands and the development deck
//! - Road networks and the longest-road search
//! - A game state machine with full rule enforcement
//!
//! # Architecture
//!
//! The engine is synchronous and holds no global state. Randomness is always
//! passed in by the caller, so a seeded RNG replays a game exactly. Commands
//! validate completely before mutating and return the [`GameEvent`]s they
//! caused.
//!
//! # Modules
//!
//! - [`layout`]: Corner coordinates, road edges and tile positions
//! - [`board`]: Tiles, settlements, ports, robber and production
//! - [`roads`]: Per-color road graphs and road length
//! - [`player`]: Player state and resources
//! - [`actions`]: Development card plays and game events
//! - [`config`]: Tunable rule parameters
//! - [`game`]: Game state machine

pub mod actions;
pub mod board;
pub mod config;
pub mod game;
pub mod layout;
pub mod player;
pub mod roads;

// Re-export commonly used types
pub use actions::{DevCardPlay, DiceRoll, GameEvent};
pub use board::{Board, BoardSnapshot, PortKind, Resource, Settlement, Tile, TileKind};
pub use config::{ConfigError, GameConfig};
pub use game::{BuildSite, Game, GameError, GamePhase, TitleHolder, UpgradeRefusal};
pub use layout::{Corner, RoadEdge, TilePos};
pub use player::{costs, DevCardKind, Player, PlayerColor, ResourceHand, SpecialCard};
pub use roads::RoadNetwork;
