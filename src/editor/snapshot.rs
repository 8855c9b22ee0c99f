//! Point-in-time snapshots of editor state.
//!
//! A [`Snapshot`] is built fresh for every request by walking the host's
//! windows frontmost-first. Nothing is cached between builds.
//!
//! # Ordering and deduplication
//!
//! - A file path appears at most once across `activeFiles` and
//!   `otherFiles`. The first view seen with a given path wins.
//! - `activeFiles` holds the focused file of each window, frontmost window
//!   first.
//! - `projectFolders` keeps the first-seen order of every folder.
//!
//! When two windows focus the same file, only the first window (in
//! frontmost-first order) lists it as active. The second window's view of
//! it has already been seen and is skipped.

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::Local;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::host::{EditorHost, Region, ViewId};

/// `strftime` format of [`Snapshot::last_updated`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// A one-based line and zero-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// One-based line number.
    pub line: usize,
    /// Zero-based column.
    pub column: usize,
}

/// The first selection region of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    /// A non-empty selection.
    Range {
        /// Start of the selection.
        start: Position,
        /// End of the selection.
        end: Position,
    },
    /// A plain cursor with nothing selected.
    Cursor {
        /// Cursor position.
        cursor: Position,
    },
}

/// One open file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// First selection of the view showing this file, or `null`.
    pub selection: Option<Selection>,
}

/// The editor state served as `sublime-context://state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Focused file of each window, frontmost window first.
    pub active_files: Vec<FileEntry>,
    /// Every other open file.
    pub other_files: Vec<FileEntry>,
    /// Union of all windows' project folders.
    pub project_folders: IndexSet<PathBuf>,
    /// Local time the snapshot was taken.
    pub last_updated: String,
}

impl Snapshot {
    /// Total number of files across both lists.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.active_files.len() + self.other_files.len()
    }
}

/// Builds a snapshot by querying `host`.
///
/// Never fails: a host with no windows produces empty lists.
#[must_use]
pub fn build_snapshot(host: &dyn EditorHost) -> Snapshot {
    let mut active_files = Vec::new();
    let mut other_files = Vec::new();
    let mut project_folders = IndexSet::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    // Native order is back to front.
    for window in host.enumerate_windows().into_iter().rev() {
        project_folders.extend(host.window_folders(window));

        let active_path = host
            .window_active_view(window)
            .and_then(|view| host.view_file_path(view));

        for view in host.window_views(window) {
            let Some(path) = host.view_file_path(view) else {
                continue;
            };
            if !seen.insert(path.clone()) {
                continue;
            }

            let entry = FileEntry {
                selection: selection_of(host, view),
                path,
            };

            if active_path.as_ref() == Some(&entry.path) {
                active_files.push(entry);
            } else {
                other_files.push(entry);
            }
        }
    }

    Snapshot {
        active_files,
        other_files,
        project_folders,
        last_updated: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Describes the first selection region of `view`.
fn selection_of(host: &dyn EditorHost, view: ViewId) -> Option<Selection> {
    let region: Region = host.view_selection_regions(view).into_iter().next()?;
    let position = |offset| {
        let rc = host.position_to_line_column(view, offset);
        Position {
            line: rc.row + 1,
            column: rc.col,
        }
    };

    if region.is_empty() {
        Some(Selection::Cursor {
            cursor: position(region.begin()),
        })
    } else {
        Some(Selection::Range {
            start: position(region.begin()),
            end: position(region.end()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cursor_serialises_as_cursor_object() {
        let selection = Selection::Cursor {
            cursor: Position { line: 4, column: 5 },
        };
        assert_eq!(
            serde_json::to_value(selection).unwrap(),
            json!({"cursor": {"line": 4, "column": 5}})
        );
    }

    #[test]
    fn range_serialises_with_start_and_end() {
        let selection = Selection::Range {
            start: Position { line: 1, column: 0 },
            end: Position { line: 2, column: 2 },
        };
        assert_eq!(
            serde_json::to_value(selection).unwrap(),
            json!({"start": {"line": 1, "column": 0}, "end": {"line": 2, "column": 2}})
        );
    }

    #[test]
    fn missing_selection_serialises_as_null() {
        let entry = FileEntry {
            path: PathBuf::from("/tmp/a.txt"),
            selection: None,
        };
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"path": "/tmp/a.txt", "selection": null})
        );
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let snapshot = Snapshot {
            active_files: Vec::new(),
            other_files: Vec::new(),
            project_folders: IndexSet::new(),
            last_updated: "2026-01-01T00:00:00.000000".to_string(),
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("activeFiles"));
        assert!(obj.contains_key("otherFiles"));
        assert!(obj.contains_key("projectFolders"));
        assert!(obj.contains_key("lastUpdated"));
    }

    #[test]
    fn selection_round_trips_through_untagged_enum() {
        let cursor: Selection =
            serde_json::from_value(json!({"cursor": {"line": 1, "column": 0}})).unwrap();
        assert!(matches!(cursor, Selection::Cursor { .. }));
    }
}
