//! HTTP surface: router assembly, shared state, and the clock port that
//! keeps relative-date behavior reproducible in tests.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod pages;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use chrono::{NaiveDateTime, Utc};
use handlebars::Handlebars;
use tower_http::trace::TraceLayer;

use crate::store::TaskStore;
use auth::AuthGuard;

/// Time source for handlers. The engine itself takes `now` as data; this
/// port is where that value comes from per request.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<TaskStore>>,
    pub(crate) guard: Arc<dyn AuthGuard>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) templates: Arc<Handlebars<'static>>,
}

impl AppState {
    pub fn new(
        store: TaskStore,
        guard: impl AuthGuard + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, handlebars::TemplateError> {
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            guard: Arc::new(guard),
            clock: Arc::new(clock),
            templates: Arc::new(pages::build_templates()?),
        })
    }

    pub(crate) fn store_read(&self) -> RwLockReadGuard<'_, TaskStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn store_write(&self) -> RwLockWriteGuard<'_, TaskStore> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Assemble the router. Reads are open; every mutating route sits behind
/// the session guard.
pub fn build_router(state: AppState) -> Router {
    let mutating = Router::new()
        .route("/add", post(handlers::add_task))
        .route("/edit/{id}", post(handlers::edit_task))
        .route("/complete/{id}", post(handlers::toggle_task))
        .route("/delete/{id}", post(handlers::delete_task))
        .route("/api/tasks", post(handlers::api_create_task))
        .route(
            "/api/tasks/{id}",
            put(handlers::api_update_task).delete(handlers::api_delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/api/tasks", get(handlers::api_list_tasks))
        .route("/api/tasks/{id}", get(handlers::api_get_task))
        .merge(mutating)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
