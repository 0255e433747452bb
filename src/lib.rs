//! # Loot Forge
//!
//! Procedural loot generation for a tabletop role-playing virtual tabletop.
//!
//! ## Architecture Overview
//!
//! The crate is the content-generation core of a host add-on. The host owns
//! actor sheets, compendium storage, dice rolling and persistence; this crate
//! consumes those through the traits in [`host`] and provides:
//!
//! - **Draw Engine**: weighted source selection and per-source item retrieval
//! - **Filters**: composable specifications restricting eligible records
//! - **Value Roller**: dice-driven prices for treasure draws
//! - **Spell Synthesizer**: scrolls and wands built from drawn spells
//! - **Stack Merging**: quantity merging into new and existing inventories
//! - **Equipment Forging**: material and rune pricing, plus a validated item builder
//!
//! ## Data Flow
//!
//! Sources and filters (read from actor flags) feed the draw engine; treasure
//! draws get their values rolled, spell draws become consumables, and the result
//! is merged into the actor's inventory before the host persists it. See
//! [`generation::LootGenerator`] for the whole pipeline.

pub mod draw;
pub mod equipment;
pub mod filter;
pub mod generation;
pub mod host;
pub mod item;
pub mod source;
pub mod spell;
pub mod stack;

// Core module re-exports
pub use draw::*;
pub use equipment::*;
pub use filter::*;
pub use generation::*;
pub use host::*;
pub use item::*;
pub use source::*;
pub use spell::*;
pub use stack::*;

/// Core error type for the loot generation engine.
#[derive(thiserror::Error, Debug)]
pub enum LootError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A source, filter or setting is malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Weighted selection was asked to choose among zero-weight candidates
    #[error("No candidate has a positive weight")]
    NoPositiveWeight,

    /// A draw slot kept missing until the retry cap was reached
    #[error("Draw exhausted: slot {slot} missed {attempts} times (last source: {source_name})")]
    DrawExhausted {
        /// Zero-based index of the draw slot that could not be filled
        slot: usize,
        /// Number of consecutive misses
        attempts: u32,
        /// Name of the last source tried
        source_name: String,
    },

    /// The item builder rejected a setting
    #[error("Validation error: {0}")]
    Validation(String),

    /// A host collaborator failed
    #[error("Host error: {0}")]
    Host(String),

    /// A dice expression could not be evaluated
    #[error("Dice error in '{expression}': {reason}")]
    Dice {
        /// The offending expression
        expression: String,
        /// What went wrong
        reason: String,
    },
}

/// Result type used throughout the Loot Forge codebase.
pub type LootResult<T> = Result<T, LootError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine-wide constants.
pub mod config {
    /// Consecutive misses tolerated for one draw slot before giving up
    pub const DEFAULT_MAX_MISSES_PER_DRAW: u32 = 10;

    /// Highest spell level; only scrolls exist at this level
    pub const MAX_SPELL_LEVEL: u32 = 10;

    /// Highest spell level a wand can hold
    pub const MAX_WAND_LEVEL: u32 = 9;

    /// Highest potency rune accepted by the item builder
    pub const MAX_POTENCY: u8 = 4;

    /// Number of property rune slots on an equipment item
    pub const MAX_PROPERTY_RUNES: usize = 4;
}
