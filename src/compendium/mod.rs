//! Compendium feature module.
//!
//! Reference material: monsters, characters, spells and groups stored
//! under per-type key prefixes. The index screen loads filtered
//! results through the async resource machine and can push item
//! details or another index (recursively).
//!
//! - `entry.rs` - closed item variant and storage keys
//! - `store.rs` - storage-backed lookup service
//! - `state.rs` - index/detail screen state
//! - `action.rs` - screen actions
//! - `reducer.rs` - index reducer and the container wrapper

mod action;
mod entry;
mod reducer;
mod state;
mod store;

pub use action::{CompendiumEntryDetailAction, CompendiumIndexAction, CompendiumIndexNextAction};
pub use entry::{
    Character, CompendiumEntry, CompendiumItem, CompendiumItemGroup, CompendiumItemType, Monster,
    Spell, StatBlock,
};
pub use reducer::compendium_container_reducer;
pub use state::{AlertState, CompendiumEntryDetailState, CompendiumIndexState, CompendiumNextScreen};
pub use store::Compendium;
