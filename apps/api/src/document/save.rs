use tracing::info;

use crate::document::model::Document;

/// Persistence boundary. Fire-and-forget: the core hands over a consistent
/// snapshot and does not wait on or inspect the outcome.
pub trait SaveSink: Send + Sync {
    fn on_save(&self, document: &Document);
}

/// Default sink: records the save in the structured log only.
pub struct TracingSaveSink;

impl SaveSink for TracingSaveSink {
    fn on_save(&self, document: &Document) {
        info!(
            doc_id = %document.doc_id,
            user_id = %document.user_id,
            blocks = document.blocks().count(),
            updated_at = %document.updated_at,
            "Document handed to save sink"
        );
    }
}
