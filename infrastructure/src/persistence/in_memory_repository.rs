// ./infrastructure/src/persistence/in_memory_repository.rs
use crate::config::RepositoryConfig;
use crate::search::matches_request;
use application::{ApplicationError, DocumentRepository, SearchRequest};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use domain::{Document, DocumentId};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Process-local document store backed by a sharded concurrent map.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentRepository {
    // Document ID -> Document
    documents: Arc<DashMap<DocumentId, Arc<Document>>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(DashMap::new()),
        }
    }

    pub fn with_config(config: &RepositoryConfig) -> Self {
        let documents = match config.shard_amount() {
            Some(shards) => DashMap::with_capacity_and_shard_amount(config.initial_capacity, shards),
            None => DashMap::with_capacity(config.initial_capacity),
        };
        debug!(
            initial_capacity = config.initial_capacity,
            shard_amount = ?config.shard_amount,
            "Created in-memory document repository"
        );
        Self {
            documents: Arc::new(documents),
        }
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    #[instrument(skip(self, document))]
    async fn save(&self, mut document: Document) -> Result<Document, ApplicationError> {
        let doc_id = document.ensure_id();
        debug!(doc_id = %doc_id, "Saving document to in-memory store");

        // The entry guard holds the shard lock, so reading the stored
        // `created` and replacing the document cannot interleave with
        // another save of the same ID.
        match self.documents.entry(doc_id) {
            Entry::Occupied(mut entry) => {
                let created = entry.get().created();
                trace!(doc_id = %entry.key(), "Document exists, keeping original created timestamp");
                document.set_created(created);
                entry.insert(Arc::new(document.clone()));
            }
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(document.clone()));
            }
        }
        Ok(document)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, ApplicationError> {
        debug!(doc_id = %id, "Getting document from in-memory store");
        Ok(self.documents.get(id).map(|doc_ref| (**doc_ref).clone()))
    }

    #[instrument(skip(self, request))]
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError> {
        let mut hits: Vec<Document> = self
            .documents
            .iter()
            .filter(|entry| matches_request(entry.value(), request))
            .map(|entry| (**entry.value()).clone())
            .collect();

        hits.sort_unstable_by(|a, b| {
            a.created()
                .cmp(&b.created())
                .then_with(|| a.id().cmp(&b.id()))
        });
        debug!(
            scanned = self.documents.len(),
            count = hits.len(),
            "In-memory search finished"
        );
        Ok(hits)
    }

    async fn count(&self) -> Result<usize, ApplicationError> {
        Ok(self.documents.len())
    }
}
