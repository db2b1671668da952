use std::sync::Arc;

use crate::config::Config;
use crate::document::save::SaveSink;
use crate::document::store::DocumentStore;
use crate::generation::collaborator::GenerationCollaborator;
use crate::preview::PreviewRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generation backend. Production: `LlmClient`; tests swap in a scripted one.
    pub collaborator: Arc<dyn GenerationCollaborator>,
    pub config: Config,
    /// Open editing sessions, keyed by document id.
    pub documents: DocumentStore,
    pub save_sink: Arc<dyn SaveSink>,
    pub previews: PreviewRegistry,
}
