//! Editor state: the host query interface and the snapshot built from it.
//!
//! # Submodules
//!
//! - [`host`] — the read-only [`EditorHost`] trait a host editor implements
//! - [`snapshot`] — [`Snapshot`] construction
//! - [`fixture`] — [`FixtureHost`], an in-memory host described by JSON

pub mod fixture;
pub mod host;
pub mod snapshot;

pub use fixture::{FixtureHost, HostState, ViewState, WindowState};
pub use host::{EditorHost, Region, RowCol, ViewId, WindowId};
pub use snapshot::{build_snapshot, FileEntry, Position, Selection, Snapshot};
