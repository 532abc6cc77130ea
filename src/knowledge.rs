//! Load-once ownership of the corpus index.
//!
//! The index is built lazily on first use. Callers that arrive while a load is in
//! flight await the same shared future, so a corpus is never read twice and no
//! query ever sees a partially built index.

use crate::corpus::{CorpusRecord, CorpusSource, MemorySource};
use crate::error::LoadError;
use crate::search::CorpusIndex;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Type alias for the shared load future.
type SharedLoad = Shared<BoxFuture<'static, Result<Arc<CorpusIndex>, LoadError>>>;

/// Load lifecycle: Uninitialized → Loading → Ready | Failed.
enum LoadState {
    Uninitialized,
    Loading(SharedLoad),
    Ready(Arc<CorpusIndex>),
    /// Terminal. The engine refuses queries with the original error.
    Failed(LoadError),
}

/// Externally visible load phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl LoadState {
    const fn phase(&self) -> LoadPhase {
        match self {
            Self::Uninitialized => LoadPhase::Uninitialized,
            Self::Loading(_) => LoadPhase::Loading,
            Self::Ready(_) => LoadPhase::Ready,
            Self::Failed(_) => LoadPhase::Failed,
        }
    }
}

/// The retrieval engine: one corpus source and the index built from it.
///
/// Construct one per process and share it behind an `Arc`.
pub struct KnowledgeBase {
    source: Arc<dyn CorpusSource>,
    state: Mutex<LoadState>,
}

impl std::fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = self
            .state
            .try_lock()
            .map(|state| format!("{:?}", state.phase()))
            .unwrap_or_else(|_| "<locked>".to_string());

        f.debug_struct("KnowledgeBase")
            .field("source", &self.source.describe())
            .field("phase", &phase)
            .finish()
    }
}

impl KnowledgeBase {
    pub fn new(source: Arc<dyn CorpusSource>) -> Self {
        Self {
            source,
            state: Mutex::new(LoadState::Uninitialized),
        }
    }

    /// Convenience constructor over in-memory records.
    pub fn from_records(records: Vec<CorpusRecord>) -> Self {
        Self::new(Arc::new(MemorySource::new(records)))
    }

    /// Description of the underlying corpus source.
    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> LoadPhase {
        self.state.lock().await.phase()
    }

    /// Loads the corpus if it has not been loaded yet.
    ///
    /// Calling this again after a successful load is a no-op.
    pub async fn load(&self) -> Result<(), LoadError> {
        self.index().await.map(|_| ())
    }

    /// Returns the loaded index, loading it first if needed.
    ///
    /// This is the main entry point for query handlers. It:
    /// 1. Returns the ready index (or the stored failure) immediately
    /// 2. Awaits an in-flight load if one exists
    /// 3. Starts a new load otherwise
    pub async fn index(&self) -> Result<Arc<CorpusIndex>, LoadError> {
        let load = {
            let mut state = self.state.lock().await;
            match &*state {
                LoadState::Ready(index) => return Ok(index.clone()),
                LoadState::Failed(error) => return Err(error.clone()),
                LoadState::Loading(load) => {
                    tracing::debug!("Awaiting in-flight corpus load");
                    load.clone()
                }
                LoadState::Uninitialized => {
                    let load = self.start_load();
                    *state = LoadState::Loading(load.clone());
                    load
                }
            }
        };

        let result = load.await;

        // Whoever finishes first records the outcome; later waiters see it already set.
        let mut state = self.state.lock().await;
        if matches!(*state, LoadState::Loading(_)) {
            *state = match &result {
                Ok(index) => LoadState::Ready(index.clone()),
                Err(error) => {
                    tracing::error!("Corpus load failed for {}: {}", self.source.describe(), error);
                    LoadState::Failed(error.clone())
                }
            };
        }

        result
    }

    /// Creates the shared load future. Reading and indexing run on the blocking pool.
    fn start_load(&self) -> SharedLoad {
        let source = self.source.clone();
        tracing::info!("Loading corpus from {}", source.describe());

        let load: BoxFuture<'static, Result<Arc<CorpusIndex>, LoadError>> = Box::pin(async move {
            tokio::task::spawn_blocking(move || -> Result<Arc<CorpusIndex>, LoadError> {
                let records = source.read_records()?;
                Ok(Arc::new(CorpusIndex::build(records)))
            })
            .await
            .map_err(|e| LoadError::Interrupted(e.to_string()))?
        });

        load.shared()
    }
}
