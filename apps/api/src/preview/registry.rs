//! Per-document preview sessions held by the service: one surface, one
//! synchronizer, one debounce scheduler and the template last selected.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::store::DocumentStore;
use crate::models::portfolio::PortfolioData;
use crate::preview::headless::HeadlessSurface;
use crate::preview::scheduler::PreviewScheduler;
use crate::preview::surface::SyncError;
use crate::preview::synchronizer::{PreviewSynchronizer, SyncReport};
use crate::templates::compiler::compile_template;
use crate::templates::descriptor::TemplateId;

pub struct PreviewSession {
    synchronizer: Mutex<PreviewSynchronizer<HeadlessSurface>>,
    scheduler: PreviewScheduler,
    template: RwLock<TemplateId>,
}

impl PreviewSession {
    fn new(delay: Duration, template: TemplateId) -> Self {
        Self {
            synchronizer: Mutex::new(PreviewSynchronizer::new(HeadlessSurface::new())),
            scheduler: PreviewScheduler::new(delay),
            template: RwLock::new(template),
        }
    }

    pub async fn template(&self) -> TemplateId {
        *self.template.read().await
    }

    /// Compiles `data` and syncs it into the surface, returning the surface
    /// document as it now stands.
    pub async fn render(
        &self,
        template: TemplateId,
        data: &PortfolioData,
    ) -> Result<(String, SyncReport), SyncError> {
        *self.template.write().await = template;
        let html = compile_template(template, data, None);
        let mut synchronizer = self.synchronizer.lock().await;
        let report = synchronizer.sync(&html).await?;
        let surface = synchronizer.surface();
        debug!(
            reloads = surface.reloads(),
            script_boots = surface.script_boots(),
            "Headless surface after sync"
        );
        Ok((surface.html(), report))
    }

    pub async fn syncs(&self) -> u64 {
        self.synchronizer.lock().await.syncs()
    }
}

#[derive(Clone)]
pub struct PreviewRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<PreviewSession>>>>,
    delay: Duration,
    default_template: TemplateId,
}

impl PreviewRegistry {
    pub fn new(delay: Duration, default_template: TemplateId) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            delay,
            default_template,
        }
    }

    pub async fn session(&self, doc_id: Uuid) -> Arc<PreviewSession> {
        if let Some(session) = self.sessions.read().await.get(&doc_id) {
            return Arc::clone(session);
        }
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(doc_id)
                .or_insert_with(|| Arc::new(PreviewSession::new(self.delay, self.default_template))),
        )
    }

    /// Drops the document's preview session. Returns false if none was open.
    pub async fn close(&self, doc_id: Uuid) -> bool {
        self.sessions.write().await.remove(&doc_id).is_some()
    }

    /// Debounced refresh after an edit: re-reads the projection when the
    /// delay expires, so only the latest state of a burst is compiled.
    pub async fn schedule_refresh(&self, doc_id: Uuid, store: DocumentStore) {
        let session = self.session(doc_id).await;
        let job_session = Arc::clone(&session);
        session.scheduler.schedule(move || async move {
            let Some(document) = store.get(doc_id).await else {
                warn!(%doc_id, "Preview refresh for a closed document");
                return;
            };
            let template = job_session.template().await;
            match job_session.render(template, &document.projection()).await {
                Ok((_, report)) => info!(
                    %doc_id,
                    %template,
                    path = ?report.path,
                    scroll_y = report.restored.y,
                    "Preview refreshed"
                ),
                Err(e) => warn!(%doc_id, error = %e, "Preview refresh failed"),
            }
        });
    }
}
