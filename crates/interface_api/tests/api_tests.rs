//! HTTP tests for the wizard API

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use core_kernel::SessionId;

use domain_intake::{InMemoryDraftStore, MockSubmissionPort, SavedDraft};
use interface_api::{config::ApiConfig, create_router, AppState};
use test_utils::{DraftFixtures, PortErrorFixtures};

struct TestApp {
    router: Router,
    state: AppState,
}

impl TestApp {
    fn new(port: MockSubmissionPort) -> Self {
        Self::with_store(port, InMemoryDraftStore::new())
    }

    fn with_store(port: MockSubmissionPort, store: InMemoryDraftStore) -> Self {
        let state = AppState::new(ApiConfig::default(), Arc::new(port), Arc::new(store));
        Self {
            router: create_router(state.clone()),
            state,
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn open_wizard(&self) -> String {
        let (status, body) = self.call(Method::POST, "/api/v1/wizards", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["sessionId"].as_str().unwrap().to_string()
    }

    /// Walks a fresh wizard to review with one dental bill attached
    async fn fill_herath(&self, id: &str) {
        let (status, _) = self
            .call(
                Method::POST,
                &format!("/api/v1/wizards/{}/claim-type", id),
                Some(json!({ "claimType": "dental" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = self
            .call(Method::POST, &format!("/api/v1/wizards/{}/documents", id), Some(bill()))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = self
            .call(
                Method::POST,
                &format!("/api/v1/wizards/{}/patient-details", id),
                Some(json!({ "patientName": "H.M.M.K Herath", "illness": "RR" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}

fn bill() -> Value {
    json!({
        "documentType": "bill",
        "documentDate": "2024-02-12",
        "amount": "4500.00",
        "sourceUri": "content://media/external/images/media/1042",
        "mimeType": "image/jpeg"
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));

    let (status, body) = app.call(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.call(Method::GET, "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["claimsBackend"]["status"], "healthy");
    assert_eq!(body["claimsBackend"]["adapterId"], "mock-submission-port");
    assert_eq!(body["activeSessions"], 0);
}

#[tokio::test]
async fn test_new_wizard_starts_on_claim_type() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));
    let id = app.open_wizard().await;

    let (status, body) = app.call(Method::GET, &format!("/api/v1/wizards/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "selectClaimType");
    assert_eq!(body["canSubmit"], false);
    assert_eq!(body["missingFields"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_full_submission_flow() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M000427"));
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;

    let (_, wizard) = app.call(Method::GET, &format!("/api/v1/wizards/{}", id), None).await;
    assert_eq!(wizard["step"], "reviewAndSubmit");
    assert_eq!(wizard["canSubmit"], true);

    let (status, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/submit", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "success");
    assert_eq!(body["referenceNo"], "M000427");
    assert_eq!(body["wizard"], Value::Null);

    // A completed wizard is discarded
    assert!(app.state.sessions.read().await.is_empty());
    let (status, _) = app.call(Method::GET, &format!("/api/v1/wizards/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_completed_wizards_do_not_accumulate() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M000427"));
    let idle = app.open_wizard().await;

    for _ in 0..3 {
        let id = app.open_wizard().await;
        app.fill_herath(&id).await;
        let (_, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/submit", id), None).await;
        assert_eq!(body["outcome"], "success");
    }

    let sessions = app.state.sessions.read().await;
    assert_eq!(sessions.len(), 1);
    assert!(sessions.keys().any(|key| key.as_uuid().to_string() == idle));
}

#[tokio::test]
async fn test_result_after_close_still_reaches_client() {
    let gate = Arc::new(tokio::sync::Notify::new());
    let app = TestApp::new(MockSubmissionPort::succeeding("M000427").with_gate(gate.clone()));
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;
    let session = app
        .state
        .session(SessionId::from_uuid(id.parse().unwrap()))
        .await
        .unwrap();

    let submit_uri = format!("/api/v1/wizards/{}/submit", id);
    let ((status, body), close_status) = tokio::join!(app.call(Method::POST, &submit_uri, None), async {
        while !session.is_submitting() {
            tokio::task::yield_now().await;
        }
        let (close_status, _) = app.call(Method::DELETE, &format!("/api/v1/wizards/{}", id), None).await;
        gate.notify_one();
        close_status
    });

    assert_eq!(close_status, StatusCode::NO_CONTENT);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "success");
    assert_eq!(body["referenceNo"], "M000427");
    assert_eq!(body["wizard"], Value::Null);
}

#[tokio::test]
async fn test_failed_submit_after_close_has_no_wizard() {
    let gate = Arc::new(tokio::sync::Notify::new());
    let app = TestApp::new(
        MockSubmissionPort::failing_with(PortErrorFixtures::service_unavailable()).with_gate(gate.clone()),
    );
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;
    let session = app
        .state
        .session(SessionId::from_uuid(id.parse().unwrap()))
        .await
        .unwrap();

    let submit_uri = format!("/api/v1/wizards/{}/submit", id);
    let ((status, body), ()) = tokio::join!(app.call(Method::POST, &submit_uri, None), async {
        while !session.is_submitting() {
            tokio::task::yield_now().await;
        }
        app.call(Method::DELETE, &format!("/api/v1/wizards/{}", id), None).await;
        gate.notify_one();
    });

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "networkFailed");
    assert_eq!(body["wizard"], Value::Null);
}

#[tokio::test]
async fn test_submit_after_back_is_conflict() {
    let port = Arc::new(MockSubmissionPort::succeeding("M000427"));
    let state = AppState::new(ApiConfig::default(), port.clone(), Arc::new(InMemoryDraftStore::new()));
    let app = TestApp {
        router: create_router(state.clone()),
        state,
    };
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;
    app.call(Method::POST, &format!("/api/v1/wizards/{}/back", id), None).await;

    let (status, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/submit", id), None).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(port.call_count(), 0);
}

#[tokio::test]
async fn test_idle_sessions_are_reaped() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));
    app.open_wizard().await;
    app.open_wizard().await;

    assert_eq!(app.state.reap_idle_sessions(Duration::from_secs(3600)).await, 0);
    assert_eq!(app.state.reap_idle_sessions(Duration::ZERO).await, 2);
    assert!(app.state.sessions.read().await.is_empty());
}

#[tokio::test]
async fn test_reaper_keeps_session_with_pending_submission() {
    let gate = Arc::new(tokio::sync::Notify::new());
    let app = TestApp::new(MockSubmissionPort::succeeding("M000427").with_gate(gate.clone()));
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;
    let session = app
        .state
        .session(SessionId::from_uuid(id.parse().unwrap()))
        .await
        .unwrap();

    let submit_uri = format!("/api/v1/wizards/{}/submit", id);
    let ((_, body), reaped) = tokio::join!(app.call(Method::POST, &submit_uri, None), async {
        while !session.is_submitting() {
            tokio::task::yield_now().await;
        }
        let reaped = app.state.reap_idle_sessions(Duration::ZERO).await;
        gate.notify_one();
        reaped
    });

    assert_eq!(reaped, 0);
    assert_eq!(body["outcome"], "success");
}

#[tokio::test]
async fn test_submit_without_documents_reports_missing() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));
    let id = app.open_wizard().await;
    app.call(
        Method::POST,
        &format!("/api/v1/wizards/{}/claim-type", id),
        Some(json!({ "claimType": "outdoor" })),
    )
    .await;

    let (status, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/submit", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "validationFailed");
    assert_eq!(body["missing"], json!(["patientName", "illness", "documents"]));
}

#[tokio::test]
async fn test_backend_outage_is_retryable() {
    let app = TestApp::new(MockSubmissionPort::failing_with(PortErrorFixtures::service_unavailable()));
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;

    let (status, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/submit", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "networkFailed");
    assert_eq!(body["retryable"], true);
    assert_eq!(body["wizard"]["step"], "reviewAndSubmit");
}

#[tokio::test]
async fn test_error_statuses() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));
    let id = app.open_wizard().await;

    // Unknown claim type
    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/v1/wizards/{}/claim-type", id),
            Some(json!({ "claimType": "maternity" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Patient details before a claim type
    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/wizards/{}/patient-details", id),
            Some(json!({ "patientName": "Herath", "illness": "RR" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    app.call(
        Method::POST,
        &format!("/api/v1/wizards/{}/claim-type", id),
        Some(json!({ "claimType": "indoor" })),
    )
    .await;
    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/v1/wizards/{}/patient-details", id),
            Some(json!({ "patientName": "Herath", "illness": "  " })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"], json!(["illness"]));

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/v1/wizards/{}/documents/{}", id, uuid::Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::GET, &format!("/api/v1/wizards/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_document_edit_and_remove() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;

    let (_, docs) = app.call(Method::GET, &format!("/api/v1/wizards/{}/documents", id), None).await;
    let doc_id = docs[0]["id"].as_str().unwrap().to_string();

    let (status, doc) = app
        .call(
            Method::PUT,
            &format!("/api/v1/wizards/{}/documents/{}", id, doc_id),
            Some(json!({ "documentType": "prescription" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["documentType"], "prescription");
    assert_eq!(doc["mimeType"], "image/jpeg");

    let (status, _) = app
        .call(Method::DELETE, &format!("/api/v1/wizards/{}/documents/{}", id, doc_id), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, wizard) = app.call(Method::GET, &format!("/api/v1/wizards/{}", id), None).await;
    assert_eq!(wizard["canSubmit"], false);
    assert_eq!(wizard["missingFields"], json!(["documents"]));
}

#[tokio::test]
async fn test_back_and_cancel() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));
    let id = app.open_wizard().await;
    app.fill_herath(&id).await;

    let (_, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/back", id), None).await;
    assert_eq!(body["step"], "enterPatientDetails");
    assert_eq!(body["draft"]["illness"], "RR");

    let (_, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/cancel", id), None).await;
    assert_eq!(body["step"], "selectClaimType");
    assert_eq!(body["draft"]["claimType"], Value::Null);

    let (status, _) = app.call(Method::POST, &format!("/api/v1/wizards/{}/back", id), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_close_removes_session() {
    let app = TestApp::new(MockSubmissionPort::succeeding("M1"));
    let id = app.open_wizard().await;

    let (status, _) = app.call(Method::DELETE, &format!("/api/v1/wizards/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.state.sessions.read().await.is_empty());

    let (status, _) = app.call(Method::DELETE, &format!("/api/v1/wizards/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_submit_later_and_resume() {
    let store = InMemoryDraftStore::new();
    let app = TestApp::with_store(MockSubmissionPort::succeeding("M1"), store.clone());
    let id = app.open_wizard().await;
    app.call(
        Method::POST,
        &format!("/api/v1/wizards/{}/claim-type", id),
        Some(json!({ "claimType": "spectacles" })),
    )
    .await;

    let (status, body) = app
        .call(Method::POST, &format!("/api/v1/wizards/{}/submit-later", id), None)
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let draft_id = body["draftId"].as_str().unwrap().to_string();

    // The save runs on a spawned task
    while store.is_empty().await {
        tokio::task::yield_now().await;
    }

    let (status, drafts) = app.call(Method::GET, "/api/v1/drafts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(drafts[0]["draftId"], draft_id.as_str());
    assert_eq!(drafts[0]["claimType"], "spectacles");

    let (status, resumed) = app
        .call(Method::POST, &format!("/api/v1/drafts/{}/resume", draft_id), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resumed["step"], "enterPatientDetails");
    assert_ne!(resumed["sessionId"], id.as_str());
}

#[tokio::test]
async fn test_resume_of_prefilled_store() {
    let store = InMemoryDraftStore::with_drafts(vec![SavedDraft::new(DraftFixtures::herath_dental())]).await;
    let app = TestApp::with_store(MockSubmissionPort::succeeding("M000427"), store.clone());

    let (_, drafts) = app.call(Method::GET, "/api/v1/drafts", None).await;
    let draft_id = drafts[0]["draftId"].as_str().unwrap().to_string();

    let (_, resumed) = app
        .call(Method::POST, &format!("/api/v1/drafts/{}/resume", draft_id), None)
        .await;
    let id = resumed["sessionId"].as_str().unwrap().to_string();
    assert_eq!(resumed["step"], "reviewAndSubmit");

    // The same draft cannot be open twice
    let (status, body) = app
        .call(Method::POST, &format!("/api/v1/drafts/{}/resume", draft_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
    assert_eq!(app.state.sessions.read().await.len(), 1);

    let (_, body) = app.call(Method::POST, &format!("/api/v1/wizards/{}/submit", id), None).await;
    assert_eq!(body["outcome"], "success");
    assert!(store.is_empty().await);

    let (status, _) = app
        .call(Method::POST, &format!("/api/v1/drafts/{}/resume", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
