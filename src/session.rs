//! Automatic session restore: a layout file at a fixed per-user path, read on startup
//! and written on shutdown.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::context::{load_layout_file, save_layout_file};
use crate::engine::CollageEngine;
use crate::foundation::error::PhotoBookResult;
use crate::layout::DEFAULT_LAYOUT;

const SESSION_DIR: &str = "photobook";
const SESSION_FILE: &str = "session.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    path: PathBuf,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Self::default_path())
    }
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/photobook/session.json`, or the working directory when the
    /// platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SESSION_DIR)
            .join(SESSION_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the previous session into `engine`.
    ///
    /// A missing or broken session file is not an error: the engine falls back to the
    /// default layout and `false` is returned.
    pub fn load_into(&self, engine: &mut CollageEngine) -> bool {
        let restored = load_layout_file(&self.path).and_then(|file| engine.apply_layout_file(&file));
        match restored {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "session restored");
                true
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "no usable session, starting fresh");
                if let Err(err) = engine.set_layout(DEFAULT_LAYOUT) {
                    tracing::warn!(error = %err, "default layout unavailable");
                }
                false
            }
        }
    }

    /// Persist `engine` for the next start, creating the session directory if needed.
    pub fn save_from(&self, engine: &CollageEngine, window_size: Option<[u32; 2]>) -> PhotoBookResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create session dir '{}'", dir.display()))?;
        }
        save_layout_file(&self.path, &engine.layout_file(window_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_ends_with_session_file() {
        let path = Session::default_path();
        assert!(path.ends_with("photobook/session.json"));
    }

    #[test]
    fn missing_session_falls_back_to_default_layout() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().join("none.json"));
        let mut engine = CollageEngine::new("single").unwrap();
        assert!(!session.load_into(&mut engine));
        assert_eq!(engine.layout_name(), DEFAULT_LAYOUT);
    }

    #[test]
    fn malformed_session_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{ not json").unwrap();
        let mut engine = CollageEngine::default();
        assert!(!Session::new(&path).load_into(&mut engine));
    }

    #[test]
    fn save_then_load_restores_layout_and_window() {
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(dir.path().join("nested/session.json"));

        let mut engine = CollageEngine::new("grid-3x3").unwrap();
        engine.set_margins(20, 30, 40);
        engine.rotate_block(2, 90).unwrap();
        session.save_from(&engine, Some([1200, 800])).unwrap();

        let file = load_layout_file(session.path()).unwrap();
        assert_eq!(file.window_size, Some([1200, 800]));

        let mut restored = CollageEngine::default();
        assert!(session.load_into(&mut restored));
        assert_eq!(restored.layout_name(), "grid-3x3");
        assert_eq!(restored.block_count(), 9);
        assert_eq!(restored.config().margins.side_px, 40);
        assert_eq!(restored.blocks()[2].rotation_deg(), 90);
    }
}
