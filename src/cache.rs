use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::loader;
use crate::models::{Contractor, ContractorSource, Entity};

/// Identity of an input file at load time. A changed size or mtime makes
/// the cached dataset stale.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    len: u64,
    mtime: Option<SystemTime>,
}

impl FileStamp {
    fn of(path: &Path) -> FileStamp {
        let meta = std::fs::metadata(path).ok();
        FileStamp {
            path: path.to_path_buf(),
            len: meta.as_ref().map(|m| m.len()).unwrap_or(0),
            mtime: meta.and_then(|m| m.modified().ok()),
        }
    }
}

/// Session-scoped memoization boundary for the two datasets.
///
/// Loading is compute-once per input-file identity; repeated calls within a
/// session reuse the parsed records. Invalidation is explicit — there is no
/// background refresh.
#[derive(Default)]
pub struct DatasetCache {
    entities: Option<(FileStamp, Arc<Vec<Entity>>)>,
    contractors: Option<(FileStamp, Arc<Vec<Contractor>>)>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities for `path`, loading on first use or when the file changed.
    pub fn entities(&mut self, path: &Path) -> Arc<Vec<Entity>> {
        let stamp = FileStamp::of(path);
        if let Some((cached_stamp, records)) = &self.entities {
            if *cached_stamp == stamp {
                log::debug!("entities cache hit for {}", path.display());
                return Arc::clone(records);
            }
        }
        let records = Arc::new(loader::entities::load(path));
        self.entities = Some((stamp, Arc::clone(&records)));
        records
    }

    /// Contractors for `source`, loading on first use or when the file changed.
    pub fn contractors(&mut self, source: &ContractorSource) -> Arc<Vec<Contractor>> {
        let stamp = FileStamp::of(source.path());
        if let Some((cached_stamp, records)) = &self.contractors {
            if *cached_stamp == stamp {
                log::debug!("contractors cache hit for {}", source);
                return Arc::clone(records);
            }
        }
        let records = Arc::new(loader::contractors::load(source));
        self.contractors = Some((stamp, Arc::clone(&records)));
        records
    }

    /// Drop everything; the next access reloads from disk.
    pub fn invalidate(&mut self) {
        self.entities = None;
        self.contractors = None;
    }
}
