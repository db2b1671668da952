//! In-memory registry of open editing sessions. This is the owner of every
//! open document, not a persistence layer: saves go through `SaveSink`.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::model::Document;
use crate::generation::gate::RequestGate;

/// An open document plus the request gate that orders its edit requests.
#[derive(Debug)]
pub struct DocumentSession {
    pub document: Document,
    pub gate: Arc<RequestGate>,
}

#[derive(Clone, Default)]
pub struct DocumentStore {
    sessions: Arc<RwLock<HashMap<Uuid, DocumentSession>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, document: Document) -> Uuid {
        let doc_id = document.doc_id;
        self.sessions.write().await.insert(
            doc_id,
            DocumentSession {
                document,
                gate: Arc::new(RequestGate::new()),
            },
        );
        doc_id
    }

    /// Clone of the current document.
    pub async fn get(&self, doc_id: Uuid) -> Option<Document> {
        self.sessions
            .read()
            .await
            .get(&doc_id)
            .map(|s| s.document.clone())
    }

    pub async fn gate(&self, doc_id: Uuid) -> Option<Arc<RequestGate>> {
        self.sessions
            .read()
            .await
            .get(&doc_id)
            .map(|s| Arc::clone(&s.gate))
    }

    /// Closes the session, returning the document as it stood.
    pub async fn remove(&self, doc_id: Uuid) -> Option<Document> {
        self.sessions
            .write()
            .await
            .remove(&doc_id)
            .map(|s| s.document)
    }

    /// Runs `f` against the document under the write lock.
    pub async fn update<R>(&self, doc_id: Uuid, f: impl FnOnce(&mut Document) -> R) -> Option<R> {
        self.sessions
            .write()
            .await
            .get_mut(&doc_id)
            .map(|s| f(&mut s.document))
    }
}
