//! Staleness tracking: per-post timestamp comparison plus a coarse
//! configuration-change signal.
//!
//! Two tiers decide what a build touches:
//!
//! 1. [`is_dirty`] — a post's page is missing or older than its source.
//!    Cheap, per-file, drives the incremental path.
//! 2. [`config_stale`] — `config.json` changed since the last recorded
//!    check. Configuration affects every rendered page invisibly to
//!    per-file timestamps, so this forces a full rebuild.
//!
//! The "last config check" lives in an explicit [`BuildState`] value that
//! the caller loads, threads through the orchestrator and persists again;
//! the functions here never touch it behind the caller's back. The scope of
//! a run is captured up front as a [`RebuildScope`], computed once before
//! any output is written.

use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

/// Version of the state file format. Bump to invalidate old state files
/// when the shape or semantics change.
const STATE_VERSION: u32 = 1;

// ============================================================================
// Per-post staleness
// ============================================================================

/// Check whether a post's generated page is out of date.
///
/// Missing target means dirty unconditionally (first-build case). An
/// unreadable source or target timestamp is treated as dirty rather than
/// silently skipping the post.
pub fn is_dirty(source: &Path, target: &Path) -> bool {
    let Ok(target_meta) = target.metadata() else {
        return true;
    };
    let Ok(target_time) = target_meta.modified() else {
        return true;
    };
    let Ok(source_meta) = source.metadata() else {
        return true;
    };
    let Ok(source_time) = source_meta.modified() else {
        return true;
    };

    source_time > target_time
}

// ============================================================================
// Build state
// ============================================================================

/// Persistent build state, stored as a small JSON file at the site root.
///
/// Loaded by the caller before a build, passed into the orchestrator and
/// persisted afterwards. Currently records only when the configuration was
/// last checked against the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildState {
    pub version: u32,
    /// Milliseconds since the Unix epoch of the last config check
    pub last_config_check: u64,
}

impl Default for BuildState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            last_config_check: 0,
        }
    }
}

impl BuildState {
    /// Load state from `path`. Missing, corrupt or version-mismatched files
    /// yield the default state, which makes the next build a full one.
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(state) if state.version == STATE_VERSION => state,
            _ => Self::default(),
        }
    }

    /// Persist state to `path`.
    pub fn store(&self, path: &Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self).expect("state serializes");
        fs::write(path, content)
    }

    /// Record that the configuration has been checked right now.
    pub fn advance(&mut self) {
        self.last_config_check = now_millis();
    }
}

/// Whether the configuration file changed since the last recorded check.
pub fn config_stale(config_path: &Path, state: &BuildState) -> bool {
    mtime_millis(config_path).is_some_and(|mtime| mtime > state.last_config_check)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn mtime_millis(path: &Path) -> Option<u64> {
    let modified = path.metadata().and_then(|m| m.modified()).ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

// ============================================================================
// Rebuild scope
// ============================================================================

/// What a single build run regenerates, decided before any write happens.
///
/// `Full` covers forced builds and configuration changes; `Selected` holds
/// exactly the source paths whose pages are individually dirty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebuildScope {
    Full,
    Selected(HashSet<PathBuf>),
}

impl RebuildScope {
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    /// Whether the given source path falls inside this scope.
    pub fn includes(&self, source: &Path) -> bool {
        match self {
            Self::Full => true,
            Self::Selected(paths) => paths.contains(source),
        }
    }

    /// Number of posts selected; `None` for a full rebuild.
    pub fn selected_count(&self) -> Option<usize> {
        match self {
            Self::Full => None,
            Self::Selected(paths) => Some(paths.len()),
        }
    }
}
