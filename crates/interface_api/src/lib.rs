//! HTTP API Layer
//!
//! This crate hosts claim intake wizards for the mobile client using Axum.
//! Each wizard is a server-side `WizardSession` addressed by its session id;
//! the client drives it one step per request and renders the returned
//! snapshot.
//!
//! # Architecture
//!
//! - **Handlers**: Wizard, saved-draft, and health endpoints
//! - **Middleware**: Request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(config, submission_port, draft_store);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod navigation;
pub mod handlers;
pub mod dto;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use core_kernel::SessionId;
use domain_intake::{ClaimSubmissionPort, DraftStorePort, WizardSession};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{drafts, health, wizard};
use crate::middleware::request_log_middleware;
use crate::navigation::LoggingNavigation;

/// A registered wizard and when a request last reached it
pub struct SessionEntry {
    pub session: Arc<WizardSession>,
    last_seen: Mutex<Instant>,
}

impl SessionEntry {
    fn new(session: Arc<WizardSession>) -> Self {
        Self {
            session,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(|p| p.into_inner()) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        self.last_seen.lock().unwrap_or_else(|p| p.into_inner()).elapsed()
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
    pub submission_port: Arc<dyn ClaimSubmissionPort>,
    pub draft_store: Arc<dyn DraftStorePort>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        submission_port: Arc<dyn ClaimSubmissionPort>,
        draft_store: Arc<dyn DraftStorePort>,
    ) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            submission_port,
            draft_store,
            config,
        }
    }

    /// Creates a session without registering it
    pub fn new_session(&self) -> Arc<WizardSession> {
        Arc::new(WizardSession::with_navigation(
            Arc::clone(&self.submission_port),
            Arc::clone(&self.draft_store),
            Arc::new(LoggingNavigation),
        ))
    }

    /// Makes a session reachable by its id
    pub async fn register(&self, session: Arc<WizardSession>) {
        self.sessions
            .write()
            .await
            .insert(session.id(), SessionEntry::new(session));
    }

    /// Registers a session holding a resumed draft
    ///
    /// Fails with `Conflict` and closes `session` if another live wizard
    /// already holds the same draft.
    pub async fn register_resumed(&self, session: Arc<WizardSession>) -> Result<(), ApiError> {
        let draft_id = session.draft_id()?;
        let mut sessions = self.sessions.write().await;

        let taken = sessions
            .values()
            .any(|entry| matches!(entry.session.draft_id(), Ok(id) if id == draft_id));
        if taken {
            session.close();
            return Err(ApiError::Conflict(format!(
                "Draft {} is already open in another wizard",
                draft_id
            )));
        }

        sessions.insert(session.id(), SessionEntry::new(session));
        Ok(())
    }

    pub async fn session(&self, id: SessionId) -> Result<Arc<WizardSession>, ApiError> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Wizard session {}", id)))?;
        entry.touch();
        Ok(Arc::clone(&entry.session))
    }

    /// Unregisters and closes a session
    pub async fn close_session(&self, id: SessionId) -> Result<(), ApiError> {
        if !self.discard_session(id).await {
            return Err(ApiError::NotFound(format!("Wizard session {}", id)));
        }
        Ok(())
    }

    /// Unregisters and closes a session if it is still registered
    pub async fn discard_session(&self, id: SessionId) -> bool {
        let Some(entry) = self.sessions.write().await.remove(&id) else {
            return false;
        };
        entry.session.close();
        info!(session_id = %id, "Wizard session removed");
        true
    }

    /// Closes wizards nobody has touched for `max_idle`
    ///
    /// Sessions with a submission in flight are kept. Returns how many were removed.
    pub async fn reap_idle_sessions(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        sessions.retain(|id, entry| {
            if entry.session.is_submitting() || entry.idle_for() < max_idle {
                return true;
            }
            entry.session.close();
            info!(session_id = %id, "Idle wizard session expired");
            false
        });

        before - sessions.len()
    }

    /// Runs `reap_idle_sessions` on the configured interval until the runtime stops
    pub fn spawn_session_reaper(&self) -> JoinHandle<()> {
        let state = self.clone();
        let max_idle = Duration::from_secs(self.config.session_idle_timeout_secs);
        let every = Duration::from_secs(self.config.session_sweep_interval_secs.max(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reaped = state.reap_idle_sessions(max_idle).await;
                if reaped > 0 {
                    debug!(reaped, "Idle session sweep");
                }
            }
        })
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Sessions, collaborators, and configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let wizard_routes = Router::new()
        .route("/", post(wizard::create_wizard))
        .route("/:id", get(wizard::get_wizard).delete(wizard::close_wizard))
        .route("/:id/claim-type", post(wizard::select_claim_type))
        .route("/:id/patient-details", post(wizard::patient_details))
        .route("/:id/back", post(wizard::back))
        .route("/:id/cancel", post(wizard::cancel))
        .route("/:id/documents", get(wizard::list_documents).post(wizard::add_document))
        .route(
            "/:id/documents/:doc_id",
            put(wizard::edit_document).delete(wizard::remove_document),
        )
        .route("/:id/submit", post(wizard::submit))
        .route("/:id/submit-later", post(wizard::submit_later));

    let draft_routes = Router::new()
        .route("/", get(drafts::list_drafts))
        .route("/:draft_id/resume", post(drafts::resume_draft));

    let api_routes = Router::new()
        .nest("/wizards", wizard_routes)
        .nest("/drafts", draft_routes)
        .layer(axum_middleware::from_fn(request_log_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
