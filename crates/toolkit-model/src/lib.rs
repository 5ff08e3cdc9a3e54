//! Data model for the emergency toolkit.
//!
//! - [`Module`] / [`FileDescriptor`]: the recursive content tree
//! - [`DisplayRow`] / [`DisplaySection`]: derived, disposable display data
//! - [`SearchHit`], [`BundleInfo`], [`TransferProgress`]: values exchanged with
//!   the index and download collaborators
//! - [`ToolkitError`]: the error type shared by every toolkit crate

pub mod display;
pub mod error;
pub mod module;
pub mod transfer;

pub use display::{
    DisplayRow, DisplaySection, Dataset, MAX_ROW_DEPTH, SelectionAction, row_count,
};
pub use error::{Result, ToolkitError};
pub use module::{
    CRITICAL_PATH_KEY, FileDescriptor, FileKind, Module, ModuleId, load_structure,
    parse_structure,
};
pub use transfer::{BundleInfo, SearchHit, TransferProgress};
