// src/scan/store.rs
// =============================================================================
// The only state shared by all workers: the discovered URLs.
//
// - Each URL is stored at most once; the first writer wins
// - Entries keep discovery order, which is also the order of the output file
// - An optional sink receives every newly inserted URL, one per line,
//   written while the lock is held so lines never interleave
//
// Callers never see the mutex. Everything goes through try_insert() and
// snapshot().
// =============================================================================

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

use crate::error::ScanError;
use crate::probe::Hit;

struct Sink {
    label: String,
    writer: Box<dyn Write + Send>,
}

#[derive(Default)]
struct Inner {
    seen: HashSet<String>,
    hits: Vec<Hit>,
    sink: Option<Sink>,
}

#[derive(Default)]
pub struct ResultStore {
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ResultStore")
            .field("hits", &inner.hits.len())
            .field("sink", &inner.sink.as_ref().map(|s| s.label.as_str()))
            .finish()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that also appends every new URL to `writer`
    pub fn with_sink(label: impl Into<String>, writer: impl Write + Send + 'static) -> Self {
        let store = Self::new();
        store.lock().sink = Some(Sink {
            label: label.into(),
            writer: Box::new(writer),
        });
        store
    }

    /// Store that appends new URLs to the file at `path`, creating it if needed
    pub fn append_to(path: &Path) -> Result<Self, ScanError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| ScanError::Output {
                path: PathBuf::from(path),
                source,
            })?;
        Ok(Self::with_sink(path.display().to_string(), file))
    }

    /// Inserts `hit` unless its URL is already present.
    ///
    /// Returns true when the hit was new. A failing sink is logged and
    /// otherwise ignored.
    pub fn try_insert(&self, hit: Hit) -> bool {
        let mut inner = self.lock();

        if !inner.seen.insert(hit.url.clone()) {
            return false;
        }

        if let Some(sink) = inner.sink.as_mut() {
            if let Err(e) = writeln!(sink.writer, "{}", hit.url).and_then(|_| sink.writer.flush()) {
                warn!(sink = %sink.label, url = %hit.url, error = %e, "failed to append result");
            }
        }

        inner.hits.push(hit);
        true
    }

    /// All hits in discovery order
    pub fn snapshot(&self) -> Vec<Hit> {
        self.lock().hits.clone()
    }

    // A worker that panicked mid-insert cannot leave the data half-written
    // (push is the last step), so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
