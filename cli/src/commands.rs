use application::{ApplicationError, DocumentService, SearchRequest, StatsService};
use domain::Document;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared services handed to every command.
#[derive(Clone)]
pub struct AppState {
    pub document_service: Arc<DocumentService>,
    pub stats_service: Arc<StatsService>,
}

/// One request line read from stdin.
#[derive(Deserialize, Debug)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    Save {
        document: Document,
    },
    FindById {
        id: String,
    },
    Search {
        #[serde(default)]
        request: SearchRequest,
    },
    Stats,
}

/// Parses a request line and runs it. Always produces a response value.
pub async fn handle_line(state: &AppState, line: &str) -> Value {
    match serde_json::from_str::<Command>(line) {
        Ok(command) => match dispatch(state, command).await {
            Ok(response) => response,
            Err(e) => map_application_error_to_response(e),
        },
        Err(e) => {
            warn!("Rejected malformed request line: {}", e);
            map_application_error_to_response(ApplicationError::InvalidInput(e.to_string()))
        }
    }
}

async fn dispatch(state: &AppState, command: Command) -> Result<Value, ApplicationError> {
    match command {
        Command::Save { document } => {
            let saved = state.document_service.save(document).await?;
            Ok(json!({ "ok": true, "document": saved }))
        }
        Command::FindById { id } => {
            let found = state.document_service.find_by_id(&id).await?;
            Ok(json!({ "ok": true, "document": found }))
        }
        Command::Search { request } => {
            let documents = state.document_service.search(request).await?;
            info!(hits = documents.len(), "Search command completed");
            Ok(json!({ "ok": true, "documents": documents }))
        }
        Command::Stats => {
            let stats = state.stats_service.get_stats().await?;
            Ok(json!({ "ok": true, "stats": stats }))
        }
    }
}

fn map_application_error_to_response(err: ApplicationError) -> Value {
    let message = match err {
        ApplicationError::InvalidInput(msg) => format!("Invalid input: {}", msg),
        ApplicationError::InfrastructureError(msg) => {
            error!("Underlying infrastructure error: {}", msg);
            "An internal error occurred".to_string()
        }
    };
    json!({ "ok": false, "error": message })
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure::InMemoryDocumentRepository;

    fn state() -> AppState {
        let repo = Arc::new(InMemoryDocumentRepository::new());
        AppState {
            document_service: Arc::new(DocumentService::new(repo.clone())),
            stats_service: Arc::new(StatsService::new(repo)),
        }
    }

    #[tokio::test]
    async fn save_then_find_by_id() {
        let state = state();
        let saved = handle_line(
            &state,
            r#"{"op":"save","document":{"id":"doc1","title":"Hello","author":{"id":"a1","name":"Ann"}}}"#,
        )
        .await;
        assert_eq!(saved["ok"], true);
        assert_eq!(saved["document"]["id"], "doc1");
        assert!(saved["document"]["created"].is_string());

        let found = handle_line(&state, r#"{"op":"findById","id":"doc1"}"#).await;
        assert_eq!(found["ok"], true);
        assert_eq!(found["document"], saved["document"]);

        let missing = handle_line(&state, r#"{"op":"findById","id":"nope"}"#).await;
        assert_eq!(missing["ok"], true);
        assert!(missing["document"].is_null());
    }

    #[tokio::test]
    async fn search_with_and_without_request() {
        let state = state();
        handle_line(&state, r#"{"op":"save","document":{"title":"Title One"}}"#).await;
        handle_line(&state, r#"{"op":"save","document":{"title":"Title Two"}}"#).await;

        let all = handle_line(&state, r#"{"op":"search"}"#).await;
        assert_eq!(all["documents"].as_array().unwrap().len(), 2);

        let filtered = handle_line(
            &state,
            r#"{"op":"search","request":{"titlePrefixes":["Title O"]}}"#,
        )
        .await;
        let documents = filtered["documents"].as_array().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["title"], "Title One");
    }

    #[tokio::test]
    async fn stats_counts_documents() {
        let state = state();
        handle_line(&state, r#"{"op":"save","document":{}}"#).await;
        let stats = handle_line(&state, r#"{"op":"stats"}"#).await;
        assert_eq!(stats["ok"], true);
        assert_eq!(stats["stats"]["store"]["total_documents"], 1);
    }

    #[tokio::test]
    async fn malformed_lines_produce_error_responses() {
        let state = state();
        for line in ["not json", r#"{"op":"delete","id":"x"}"#, r#"{"op":"findById"}"#] {
            let response = handle_line(&state, line).await;
            assert_eq!(response["ok"], false);
            assert!(response["error"].as_str().unwrap().starts_with("Invalid input"));
        }
    }
}
