pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::document::handlers as documents;
use crate::generation::handlers as generation;
use crate::quality::handlers as quality;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Templates API
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route("/api/v1/templates/:id", get(templates::handle_get_template))
        .route("/api/v1/compile", post(templates::handle_compile))
        // Documents API
        .route("/api/v1/documents", post(generation::handle_create_document))
        .route(
            "/api/v1/documents/:id",
            get(documents::handle_get_document).delete(documents::handle_close_document),
        )
        .route(
            "/api/v1/documents/:id/blocks/:block_id",
            patch(documents::handle_commit_block),
        )
        .route(
            "/api/v1/documents/:id/blocks/:block_id/focus",
            post(documents::handle_focus_block),
        )
        .route(
            "/api/v1/documents/:id/blocks/:block_id/blur",
            post(documents::handle_blur_block),
        )
        .route(
            "/api/v1/documents/:id/entries/:kind/:entry_id",
            patch(documents::handle_edit_entry).delete(documents::handle_delete_entry),
        )
        .route(
            "/api/v1/documents/:id/edit",
            post(generation::handle_edit_document),
        )
        .route("/api/v1/documents/:id/preview", get(documents::handle_preview))
        // Quality API
        .route("/api/v1/quality/score", post(quality::handle_score))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::document::save::testing::RecordingSink;
    use crate::document::save::{SaveSink, TracingSaveSink};
    use crate::document::store::DocumentStore;
    use crate::generation::collaborator::testing::ScriptedCollaborator;
    use crate::preview::PreviewRegistry;
    use crate::templates::TemplateId;

    fn state(collaborator: Arc<ScriptedCollaborator>, save_sink: Arc<dyn SaveSink>) -> AppState {
        let config = Config {
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            preview_debounce: Duration::from_millis(10),
            default_template: TemplateId::Minimal,
        };
        AppState {
            collaborator,
            documents: DocumentStore::new(),
            save_sink,
            previews: PreviewRegistry::new(config.preview_debounce, config.default_template),
            config,
        }
    }

    fn app(collaborator: Arc<ScriptedCollaborator>) -> Router {
        build_router(state(collaborator, Arc::new(TracingSaveSink)))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json_of(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    fn fill_reply() -> String {
        json!({
            "fills": [
                {"target": "about", "text": "I build difference engines.", "confidence": 0.7, "reason": "From title"}
            ]
        })
        .to_string()
    }

    async fn create_document(app: &Router) -> Value {
        create_document_with(
            app,
            json!({"name": "Ada Lovelace", "title": "Engineer", "email": "ada@example.com"}),
        )
        .await
    }

    async fn create_document_with(app: &Router, portfolio: Value) -> Value {
        let (status, body) = send(
            app,
            "POST",
            "/api/v1/documents",
            Some(json!({"user_id": Uuid::new_v4(), "portfolio": portfolio})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        json_of(&body)
    }

    fn with_projects() -> Value {
        json!({
            "name": "Ada Lovelace",
            "title": "Engineer",
            "about": "I write programs for engines.",
            "projects": [
                {"name": "Engine", "description": "Steam powered"},
                {"name": "Loom", "description": "Punched cards"}
            ]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(Arc::default()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["service"], "folio-api");
    }

    #[tokio::test]
    async fn test_template_routes() {
        let app = app(Arc::default());

        let (status, body) = send(&app, "GET", "/api/v1/templates", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["templates"].as_array().unwrap().len(), 4);

        let (status, _) = send(&app, "GET", "/api/v1/templates/retro", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/compile",
            Some(json!({"template_id": "retro", "data": {"name": "Ada"}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["error"]["code"], "UNKNOWN_TEMPLATE");

        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/compile",
            Some(json!({"template_id": "Timeline", "data": {"name": "Ada", "location": null}})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let html = json_of(&body)["html"].as_str().unwrap().to_string();
        assert!(html.contains("Ada"));
        assert!(!html.contains("undefined"));
    }

    #[tokio::test]
    async fn test_create_commit_and_preview() {
        let script = Arc::new(ScriptedCollaborator::default());
        script.push(Duration::ZERO, Ok(fill_reply()));
        let app = app(script);

        let created = create_document(&app).await;
        assert_eq!(created["filled"], json!(["about"]));
        let doc_id = created["document"]["doc_id"].as_str().unwrap().to_string();
        let block = &created["document"]["sections"][0]["blocks"][0];
        assert_eq!(block["origin"], "ai_generated");
        let block_id = block["block_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/v1/documents/{doc_id}/blocks/{block_id}"),
            Some(json!({"text": "I design engines.", "editor_id": "ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let commit = json_of(&body);
        assert_eq!(commit["outcome"], "committed");
        assert_eq!(commit["block"]["origin"], "user_edited");
        assert_eq!(commit["block"]["edit_history"].as_array().unwrap().len(), 1);

        let (status, html) = send(
            &app,
            "GET",
            &format!("/api/v1/documents/{doc_id}/preview?template=developer"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("I design engines."));
        assert!(html.contains("Ada Lovelace"));

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/v1/documents/{doc_id}/preview?template=retro"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stale_block_commit_is_an_outcome() {
        let app = app(Arc::default());
        let created = create_document(&app).await;
        assert_eq!(created["unfilled"], json!(["about"]));
        let doc_id = created["document"]["doc_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "PATCH",
            &format!("/api/v1/documents/{doc_id}/blocks/{}", Uuid::new_v4()),
            Some(json!({"text": "x", "editor_id": "ada"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["outcome"], "stale_block_reference");

        let (status, _) = send(&app, "GET", &format!("/api/v1/documents/{}", Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_malformed_edit_leaves_document_unchanged() {
        let script = Arc::new(ScriptedCollaborator::default());
        script.push(Duration::ZERO, Ok(fill_reply()));
        script.push(Duration::ZERO, Ok("Sure! Here is your update.".to_string()));
        let app = app(script);

        let created = create_document(&app).await;
        let doc_id = created["document"]["doc_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/documents/{doc_id}/edit"),
            Some(json!({"instruction": "make the intro shorter"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_of(&body)["error"]["code"], "MALFORMED_COLLABORATOR_RESPONSE");

        let (status, body) = send(&app, "GET", &format!("/api/v1/documents/{doc_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body), created["document"]);
    }

    #[tokio::test]
    async fn test_edit_applies_collaborator_record() {
        let script = Arc::new(ScriptedCollaborator::default());
        script.push(Duration::ZERO, Ok(fill_reply()));
        let app = app(script.clone());
        let created = create_document(&app).await;
        let doc_id = created["document"]["doc_id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/v1/documents/{doc_id}/edit"),
            Some(json!({"instruction": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut record = created["document"]["projection"].clone();
        record["title"] = json!("Analyst");
        script.push(Duration::ZERO, Ok(record.to_string()));

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/documents/{doc_id}/edit"),
            Some(json!({"instruction": "I am an analyst now"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let edit = json_of(&body);
        assert_eq!(edit["changes"], json!([{"type": "scalar", "field": "title"}]));
        assert_eq!(edit["document"]["projection"]["title"], "Analyst");
        assert_eq!(edit["document"]["projection"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_entry_edit_marks_field_user_edited() {
        let app = app(Arc::default());
        let created = create_document_with(&app, with_projects()).await;
        let doc_id = created["document"]["doc_id"].as_str().unwrap().to_string();
        let entry_id = created["document"]["projection"]["projects"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();
        let uri = format!("/api/v1/documents/{doc_id}/entries/project/{entry_id}");

        let (status, body) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({"field": "description", "value": "Analytical"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let edit = json_of(&body);
        assert_eq!(edit["kind"], "project");
        assert_eq!(edit["provenance"]["origin"], "user_edited");

        let (status, _) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({"field": "tech_stack", "value": ["Rust", "Tokio"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, "GET", &format!("/api/v1/documents/{doc_id}"), None).await;
        let document = json_of(&body);
        let project = &document["projection"]["projects"][0];
        assert_eq!(project["description"], "Analytical");
        assert_eq!(project["techStack"], json!(["Rust", "Tokio"]));
        assert_eq!(
            document["provenance"][&entry_id]["description"]["origin"],
            "user_edited"
        );
        assert_eq!(document["projection"]["projects"][1]["description"], "Punched cards");

        let (status, body) = send(
            &app,
            "PATCH",
            &uri,
            Some(json!({"field": "school", "value": "MIT"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["error"]["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/v1/documents/{doc_id}/entries/award/{entry_id}"),
            Some(json!({"field": "title", "value": "Best Paper"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_entry_delete_drops_entry_and_its_provenance() {
        let app = app(Arc::default());
        let created = create_document_with(&app, with_projects()).await;
        let doc_id = created["document"]["doc_id"].as_str().unwrap().to_string();
        let projects = &created["document"]["projection"]["projects"];
        let engine = projects[0]["id"].as_str().unwrap().to_string();
        let loom = projects[1]["id"].as_str().unwrap().to_string();

        for id in [&engine, &loom] {
            let (status, _) = send(
                &app,
                "PATCH",
                &format!("/api/v1/documents/{doc_id}/entries/project/{id}"),
                Some(json!({"field": "period", "value": "1843"})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let uri = format!("/api/v1/documents/{doc_id}/entries/project/{engine}");
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, body) = send(&app, "GET", &format!("/api/v1/documents/{doc_id}"), None).await;
        let document = json_of(&body);
        let remaining = document["projection"]["projects"].as_array().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["id"], loom.as_str());
        assert!(document["provenance"].get(&engine).is_none());
        assert_eq!(document["provenance"][&loom]["period"]["origin"], "user_edited");

        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_close_document_saves_and_evicts_sessions() {
        let sink = Arc::new(RecordingSink::default());
        let state = state(Arc::default(), sink.clone());
        let app = build_router(state.clone());

        let created = create_document(&app).await;
        let doc_id = created["document"]["doc_id"].as_str().unwrap().to_string();
        let (status, _) = send(&app, "GET", &format!("/api/v1/documents/{doc_id}/preview"), None).await;
        assert_eq!(status, StatusCode::OK);

        let uri = format!("/api/v1/documents/{doc_id}");
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let saved = sink.saved();
        assert_eq!(saved.last().unwrap().doc_id.to_string(), doc_id);

        let doc_uuid: Uuid = doc_id.parse().unwrap();
        assert!(state.documents.get(doc_uuid).await.is_none());
        assert!(!state.previews.close(doc_uuid).await);

        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_quality_score_route() {
        let app = app(Arc::default());
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/quality/score",
            Some(json!({"text": "", "max_length": 200, "section_type": "reflection"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let report = json_of(&body);
        assert_eq!(report["score"], 0);
        assert_eq!(report["checks"].as_array().unwrap().len(), 6);
    }
}
