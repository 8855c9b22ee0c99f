//! An in-memory editor host described by JSON.
//!
//! The standalone binary serves a [`FixtureHost`] loaded from a file, and
//! tests use it to build deterministic window layouts. The state sits
//! behind a lock so it can be swapped while a server is running.
//!
//! # Format
//!
//! ```json
//! {
//!   "windows": [
//!     {
//!       "folders": ["/home/me/project"],
//!       "active_view": 0,
//!       "views": [
//!         { "file": "/home/me/project/main.rs", "text": "fn main() {}\n",
//!           "selections": [{ "a": 3, "b": 3 }] }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Windows are listed back to front, like a real host enumerates them.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use serde::{Deserialize, Serialize};

use super::host::{EditorHost, Region, RowCol, ViewId, WindowId};
use crate::error::FixtureError;

/// Complete host state: every window, back to front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostState {
    /// Open windows in native (back-to-front) order.
    #[serde(default)]
    pub windows: Vec<WindowState>,
}

impl HostState {
    /// Creates a state with the given windows.
    #[must_use]
    pub const fn new(windows: Vec<WindowState>) -> Self {
        Self { windows }
    }
}

/// One editor window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WindowState {
    /// Project folders open in this window.
    #[serde(default)]
    pub folders: Vec<PathBuf>,
    /// Index into `views` of the focused view.
    #[serde(default)]
    pub active_view: Option<usize>,
    /// Views in tab order.
    #[serde(default)]
    pub views: Vec<ViewState>,
}

impl WindowState {
    /// Creates an empty window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a project folder.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folders.push(folder.into());
        self
    }

    /// Appends a view.
    #[must_use]
    pub fn with_view(mut self, view: ViewState) -> Self {
        self.views.push(view);
        self
    }

    /// Focuses the view at `index`.
    #[must_use]
    pub const fn focused(mut self, index: usize) -> Self {
        self.active_view = Some(index);
        self
    }
}

/// One view: a file (or unsaved buffer), its text and selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViewState {
    /// Backing file, `None` for an unsaved buffer.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Buffer contents, used to translate offsets to rows and columns.
    #[serde(default)]
    pub text: String,
    /// Selection regions, primary first.
    #[serde(default)]
    pub selections: Vec<Region>,
}

impl ViewState {
    /// A view backed by `path`.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    /// A view with no backing file.
    #[must_use]
    pub fn unsaved() -> Self {
        Self::default()
    }

    /// Sets the buffer contents.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Adds a selection region.
    #[must_use]
    pub fn with_selection(mut self, region: Region) -> Self {
        self.selections.push(region);
        self
    }
}

/// An [`EditorHost`] serving a [`HostState`].
#[derive(Debug, Default)]
pub struct FixtureHost {
    state: RwLock<HostState>,
}

impl FixtureHost {
    /// Creates a host serving `state`.
    #[must_use]
    pub const fn new(state: HostState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Creates a host with no windows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a host from its JSON description.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` does not describe a host state.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json).map(Self::new)
    }

    /// Loads a host from a JSON fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let contents = std::fs::read_to_string(path).map_err(|e| FixtureError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_json(&contents).map_err(|e| FixtureError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Replaces the served state.
    pub fn set_state(&self, state: HostState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Returns a copy of the served state.
    #[must_use]
    pub fn state(&self) -> HostState {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, HostState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_view<T>(&self, view: ViewId, f: impl FnOnce(&ViewState) -> T) -> Option<T> {
        let (window, index) = split_view_id(view);
        let state = self.read();
        state
            .windows
            .get(window)
            .and_then(|w| w.views.get(index))
            .map(f)
    }
}

// Views are addressed by window index in the high half and view index in
// the low half of the id.
const VIEW_INDEX_BITS: u32 = 32;

#[allow(clippy::cast_possible_truncation)] // indices never exceed 32 bits
const fn view_id(window: usize, index: usize) -> ViewId {
    ViewId(((window as u64) << VIEW_INDEX_BITS) | (index as u64 & 0xFFFF_FFFF))
}

#[allow(clippy::cast_possible_truncation)] // ids are built by view_id
const fn split_view_id(view: ViewId) -> (usize, usize) {
    (
        (view.0 >> VIEW_INDEX_BITS) as usize,
        (view.0 & 0xFFFF_FFFF) as usize,
    )
}

#[allow(clippy::cast_possible_truncation)]
const fn window_index(window: WindowId) -> usize {
    window.0 as usize
}

/// Row and column of a character offset, clamped to the end of `text`.
fn rowcol(text: &str, offset: usize) -> RowCol {
    let mut row = 0;
    let mut col = 0;
    for ch in text.chars().take(offset) {
        if ch == '\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }
    RowCol::new(row, col)
}

impl EditorHost for FixtureHost {
    fn enumerate_windows(&self) -> Vec<WindowId> {
        (0..self.read().windows.len())
            .map(|i| WindowId(i as u64))
            .collect()
    }

    fn window_folders(&self, window: WindowId) -> Vec<PathBuf> {
        self.read()
            .windows
            .get(window_index(window))
            .map(|w| w.folders.clone())
            .unwrap_or_default()
    }

    fn window_active_view(&self, window: WindowId) -> Option<ViewId> {
        let index = window_index(window);
        let state = self.read();
        let w = state.windows.get(index)?;
        w.active_view
            .filter(|&active| active < w.views.len())
            .map(|active| view_id(index, active))
    }

    fn window_views(&self, window: WindowId) -> Vec<ViewId> {
        let index = window_index(window);
        self.read()
            .windows
            .get(index)
            .map(|w| (0..w.views.len()).map(|v| view_id(index, v)).collect())
            .unwrap_or_default()
    }

    fn view_file_path(&self, view: ViewId) -> Option<PathBuf> {
        self.with_view(view, |v| v.file.clone()).flatten()
    }

    fn view_selection_regions(&self, view: ViewId) -> Vec<Region> {
        self.with_view(view, |v| v.selections.clone())
            .unwrap_or_default()
    }

    fn position_to_line_column(&self, view: ViewId, offset: usize) -> RowCol {
        self.with_view(view, |v| rowcol(&v.text, offset))
            .unwrap_or(RowCol::new(0, 0))
    }
}
