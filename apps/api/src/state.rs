use std::sync::Arc;

use crate::config::Config;
use crate::forms::FormStore;
use crate::normalization::AiNormalizer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable AI backend. `DisabledNormalizer` when no endpoint is configured.
    pub normalizer: Arc<dyn AiNormalizer>,
    pub forms: Arc<FormStore>,
}
