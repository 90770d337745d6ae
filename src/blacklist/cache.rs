//! Process-scoped deny-list cache
//!
//! The deny-list is read once per running instance and shared read-only by every
//! orchestration run afterwards.

use crate::blacklist::Blacklist;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily loaded, write-once deny-list
#[derive(Debug)]
pub struct BlacklistCache {
    path: PathBuf,
    cell: OnceCell<Arc<Blacklist>>,
}

impl BlacklistCache {
    /// Creates a cache that will load from `path` on first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    /// Creates a cache that is already populated
    pub fn preloaded(list: Blacklist) -> Self {
        Self {
            path: PathBuf::new(),
            cell: OnceCell::new_with(Some(Arc::new(list))),
        }
    }

    /// Returns the deny-list, loading it on first call
    ///
    /// Load failures degrade to an empty list; this never fails.
    pub async fn get(&self) -> Arc<Blacklist> {
        self.cell
            .get_or_init(|| async {
                let path = self.path.clone();
                let list = tokio::task::spawn_blocking(move || Blacklist::load_or_empty(&path))
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Blacklist load task failed, continuing with none");
                        Blacklist::empty()
                    });
                Arc::new(list)
            })
            .await
            .clone()
    }

    /// Returns true once the list has been loaded
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }
}
