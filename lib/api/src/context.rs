//! Serving-side model state.
//!
//! There is no global mutable model. The context owns the artifact store
//! and a single slot holding the currently served predictor; reload swaps
//! the `Arc` under a short write lock, so concurrent requests either keep
//! the predictor they already took or see the new one, never a mix.

use parking_lot::RwLock;
use scorecast_core::Predictor;
use scorecast_storage::{ArtifactError, ArtifactStore};
use std::sync::Arc;
use tracing::{info, warn};

pub struct ServiceContext {
    store: ArtifactStore,
    slot: RwLock<Option<Arc<Predictor>>>,
}

impl ServiceContext {
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            slot: RwLock::new(None),
        }
    }

    /// Create a context and attempt an initial load. A missing artifact is
    /// not a startup failure; the service comes up not ready and health
    /// checks report it.
    pub fn with_startup_load(store: ArtifactStore) -> Result<Self, ArtifactError> {
        let ctx = Self::new(store);
        match ctx.reload() {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                warn!("no model artifact found; serving in not-ready state");
            }
            Err(e) => return Err(e),
        }
        Ok(ctx)
    }

    /// Load the stored bundle and swap it in. In-flight requests hold
    /// their own `Arc` and finish against the bundle they started with.
    pub fn reload(&self) -> Result<(), ArtifactError> {
        let bundle = self.store.load()?;
        info!(
            bundle_id = %bundle.id,
            estimator = %bundle.report.estimator,
            r2 = bundle.metrics.r2,
            "model bundle loaded"
        );
        *self.slot.write() = Some(Arc::new(Predictor::new(bundle)));
        Ok(())
    }

    /// The predictor currently being served, if any.
    pub fn predictor(&self) -> Option<Arc<Predictor>> {
        self.slot.read().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.read().is_some()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }
}
