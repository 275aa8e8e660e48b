use std::sync::Arc;

use csvtidy_core::CleanRequest;

/// Shared by every handler. Holds no per-run state, so concurrent uploads
/// are independent.
#[derive(Clone, Default)]
pub struct AppState {
    defaults: Arc<CleanRequest>,
}

impl AppState {
    pub fn new(defaults: CleanRequest) -> Self {
        Self {
            defaults: Arc::new(defaults),
        }
    }

    /// Request used for uploads that send no `options` or `parse` part.
    pub fn defaults(&self) -> &CleanRequest {
        &self.defaults
    }
}
