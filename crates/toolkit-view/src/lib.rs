//! View engine for the emergency toolkit.
//!
//! Turns the content tree into display datasets and keeps the one on screen
//! current:
//!
//! - `depth` - depth map over every identified module
//! - `expansion` - which modules the user has expanded
//! - `materialize` - tree + expansion → standard dataset
//! - `search` - fail-soft index adapter and grouping of hits by parent
//! - `index` - in-memory index over the tree's tools
//! - `debounce` - keystroke coalescing with sequence-tagged queries
//! - `session` - dataset modes and the atomically replaced active dataset
//! - `actor` - runs a session on one task and wires search into it
//! - `actions` - actions offered on tool rows

pub mod actions;
pub mod actor;
pub mod config;
pub mod debounce;
pub mod depth;
pub mod expansion;
pub mod index;
pub mod materialize;
pub mod search;
pub mod session;

pub use actions::{ToolAction, actions_for};
pub use actor::{SessionCommand, SessionHandle, spawn_session};
pub use config::SearchConfig;
pub use debounce::{DebounceState, SearchDebouncer, SearchTicket, TextChange};
pub use depth::{DepthMap, compute_depths};
pub use expansion::ExpansionState;
pub use index::TreeIndex;
pub use materialize::materialize;
pub use search::{ContentIndexService, SearchAdapter, group_hits};
pub use session::{ActiveView, DatasetMode, Selection, ToolkitSession};
