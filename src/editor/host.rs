//! The read-only view of the host editor that snapshots are built from.
//!
//! A host is anything that can enumerate its windows and the views inside
//! them. The snapshot builder only ever calls these queries; it never asks
//! the host to change anything.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque handle for a host window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub u64);

/// Opaque handle for a view (tab, buffer) inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

/// A selection region in character offsets.
///
/// `a` is the anchor and `b` the caret, so `a > b` for a backwards
/// selection. A region with `a == b` is a plain cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Anchor offset.
    pub a: usize,
    /// Caret offset.
    pub b: usize,
}

impl Region {
    /// Creates a region spanning `a` to `b`.
    #[must_use]
    pub const fn new(a: usize, b: usize) -> Self {
        Self { a, b }
    }

    /// Creates an empty region (a cursor) at `offset`.
    #[must_use]
    pub const fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// The smaller of the two offsets.
    #[must_use]
    pub const fn begin(self) -> usize {
        if self.a < self.b {
            self.a
        } else {
            self.b
        }
    }

    /// The larger of the two offsets.
    #[must_use]
    pub const fn end(self) -> usize {
        if self.a < self.b {
            self.b
        } else {
            self.a
        }
    }

    /// Returns `true` if the region selects nothing.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.a == self.b
    }
}

/// A zero-based row and column, as hosts report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCol {
    /// Zero-based row.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl RowCol {
    /// Creates a new row/column pair.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Read-only queries against a live editor.
///
/// Implementations are called from the transport's request handler thread, so they
/// must be `Send + Sync`. Every method is a point-in-time query; the host
/// may change between two calls and callers accept that.
pub trait EditorHost: Send + Sync {
    /// All open windows in the host's native order (back to front).
    fn enumerate_windows(&self) -> Vec<WindowId>;

    /// Project folders open in `window`.
    fn window_folders(&self, window: WindowId) -> Vec<PathBuf>;

    /// The view that has focus in `window`, if any.
    fn window_active_view(&self, window: WindowId) -> Option<ViewId>;

    /// Every view in `window`, in the host's tab order.
    fn window_views(&self, window: WindowId) -> Vec<ViewId>;

    /// Path of the file backing `view`; `None` for unsaved buffers.
    fn view_file_path(&self, view: ViewId) -> Option<PathBuf>;

    /// Current selection regions of `view`, primary region first.
    fn view_selection_regions(&self, view: ViewId) -> Vec<Region>;

    /// Translates a character offset in `view` to a row and column.
    fn position_to_line_column(&self, view: ViewId, offset: usize) -> RowCol;
}
