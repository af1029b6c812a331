use async_trait::async_trait;
use domain::{Document, DocumentId, Timestamp};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{MemoryRefreshKind, Pid, System};
use thiserror::Error;
use tracing::{debug, error, info, instrument};

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// --- Search Criteria ---

/// Filter criteria for [`DocumentService::search`].
///
/// Dimensions are combined with AND; the values inside one dimension are
/// combined with OR. A dimension that is `None` or empty places no
/// constraint on the result.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_prefixes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains_contents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_ids: Option<Vec<String>>,
    /// Inclusive lower bound on `created`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_from: Option<Timestamp>,
    /// Inclusive upper bound on `created`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_to: Option<Timestamp>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.title_prefixes = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_contains_contents<I, S>(mut self, substrings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contains_contents = Some(substrings.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_author_ids<I, S>(mut self, author_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.author_ids = Some(author_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_created_from(mut self, from: Timestamp) -> Self {
        self.created_from = Some(from);
        self
    }

    pub fn with_created_to(mut self, to: Timestamp) -> Self {
        self.created_to = Some(to);
        self
    }

    /// True when no dimension constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        fn unset(values: &Option<Vec<String>>) -> bool {
            values.as_ref().is_none_or(|v| v.is_empty())
        }
        unset(&self.title_prefixes)
            && unset(&self.contains_contents)
            && unset(&self.author_ids)
            && self.created_from.is_none()
            && self.created_to.is_none()
    }
}

// --- Infrastructure Interfaces (Traits) ---

/// Interface for storing and retrieving documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts or replaces a document under its identifier.
    ///
    /// If a document is already stored under the same identifier, its
    /// `created` timestamp is carried over onto the incoming document. The
    /// lookup and the write happen atomically for that key. Returns the
    /// document as stored.
    async fn save(&self, document: Document) -> Result<Document, ApplicationError>;
    /// Retrieves a document by its ID.
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>, ApplicationError>;
    /// Returns every stored document matching the request, ordered by
    /// `created` and then by ID.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Document>, ApplicationError>;
    /// Returns the number of stored documents.
    async fn count(&self) -> Result<usize, ApplicationError>;
}

// --- Application Services (Use Cases) ---

/// The document store: save, lookup by ID, and multi-criteria search.
pub struct DocumentService {
    doc_repo: Arc<dyn DocumentRepository>,
}

impl DocumentService {
    pub fn new(doc_repo: Arc<dyn DocumentRepository>) -> Self {
        Self { doc_repo }
    }

    /// Saves (creates or updates) a document.
    ///
    /// A missing or empty ID is replaced with a generated one, and a missing
    /// `created` is set to the current time. When the ID is already in use,
    /// the stored document's `created` wins over whatever the caller passed.
    #[instrument(skip(self, document))]
    pub async fn save(&self, mut document: Document) -> Result<Document, ApplicationError> {
        let doc_id = document.ensure_id();
        document.ensure_created(chrono::Utc::now());
        debug!(doc_id = %doc_id, "Resolved document identity");

        let saved = self.doc_repo.save(document).await.map_err(|e| {
            error!(doc_id = %doc_id, "Failed to save document to repository: {}", e);
            e
        })?;
        info!(doc_id = %doc_id, "Document saved successfully");
        Ok(saved)
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>, ApplicationError> {
        let doc_id = DocumentId::new(id.to_string());
        let found = self.doc_repo.get(&doc_id).await?;
        debug!(doc_id = %id, found = found.is_some(), "Looked up document");
        Ok(found)
    }

    #[instrument(skip(self, request))]
    pub async fn search(&self, request: SearchRequest) -> Result<Vec<Document>, ApplicationError> {
        let start_time = Instant::now();
        let documents = self.doc_repo.search(&request).await?;
        info!(
            hits = documents.len(),
            unconstrained = request.is_unconstrained(),
            time_ms = start_time.elapsed().as_millis(),
            "Search finished"
        );
        Ok(documents)
    }
}

// --- Statistics ---

#[derive(Serialize, Debug)]
pub struct MemoryStats {
    total_bytes: u64,
    used_bytes: u64,         // Physical memory used by all processes
    available_bytes: u64,    // Memory available without swapping
    process_used_bytes: u64, // Memory used by this process
}

#[derive(Serialize, Debug)]
pub struct StoreStats {
    pub total_documents: usize,
}

#[derive(Serialize, Debug)]
pub struct SystemInfo {
    os_name: String,
    os_version: String,
}

#[derive(Serialize, Debug)]
pub struct StatsResponse {
    pub system_info: SystemInfo,
    pub memory: MemoryStats,
    pub store: StoreStats,
}

pub struct StatsService {
    doc_repo: Arc<dyn DocumentRepository>,
}

impl StatsService {
    pub fn new(doc_repo: Arc<dyn DocumentRepository>) -> Self {
        Self { doc_repo }
    }

    #[instrument(skip(self))]
    pub async fn get_stats(&self) -> Result<StatsResponse, ApplicationError> {
        info!("Gathering store and system statistics");

        let total_documents = self.doc_repo.count().await.map_err(|e| {
            error!("Failed to count documents for stats: {}", e);
            ApplicationError::InfrastructureError("Failed to retrieve document count".to_string())
        })?;
        let store = StoreStats { total_documents };
        debug!("Store stats gathered: {:?}", store);

        // sysinfo refreshes are blocking
        let (system_info, memory) = tokio::task::spawn_blocking(|| {
            let mut sys = System::new_all();
            sys.refresh_memory_specifics(MemoryRefreshKind::everything());

            let current_pid = Pid::from(std::process::id() as usize);
            let process_memory = sys.process(current_pid).map_or(0, |p| p.memory());

            let memory = MemoryStats {
                total_bytes: sys.total_memory(),
                used_bytes: sys.used_memory(),
                available_bytes: sys.available_memory(),
                process_used_bytes: process_memory,
            };
            let system_info = SystemInfo {
                os_name: System::name().unwrap_or_else(|| "Unknown OS".to_string()),
                os_version: System::os_version().unwrap_or_else(|| "Unknown Version".to_string()),
            };
            (system_info, memory)
        })
        .await
        .map_err(|e| {
            ApplicationError::InfrastructureError(format!(
                "System stat gathering task failed: {}",
                e
            ))
        })?;
        debug!("System stats gathered: {:?}, {:?}", system_info, memory);

        Ok(StatsResponse {
            system_info,
            memory,
            store,
        })
    }
}
