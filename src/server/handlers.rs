use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, Html, IntoResponse, Redirect, Response};
use chrono::NaiveDateTime;
use serde_json::json;
use tracing::warn;

use super::AppState;
use super::auth::{clear_session_cookie, session_cookie, session_token};
use super::dto::{
    AddTaskForm, CreateTaskRequest, EditTaskForm, LoginForm, TaskListResponse, TaskResponse,
    UpdateTaskRequest, ViewParams,
};
use super::error::ApiError;
use super::pages;
use crate::models::parse_due_date;
use crate::store::{TaskDraft, TaskPatch};

type ApiResult<T> = Result<T, ApiError>;

/// Due-date text from a form or JSON body. Unparseable input is dropped —
/// the task keeps whatever deadline it had.
fn due_date_or_none(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match parse_due_date(raw) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!("ignoring {err}");
            None
        }
    }
}

fn render_error(err: handlebars::RenderError) -> ApiError {
    ApiError::Internal(err.to_string())
}

// ---- Pages ----

pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
    headers: HeaderMap,
) -> ApiResult<Html<String>> {
    let query = params.to_query(state.clock.now());
    let tasks = state.store_read().all()?;
    let view = query.run(&tasks);

    let logged_in = state.guard.authorize(session_token(&headers).as_deref());
    let html = pages::render_index(&state.templates, &view, &query, logged_in)
        .map_err(render_error)?;
    Ok(Html(html))
}

pub async fn login_page(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let html = pages::render_login(&state.templates, None).map_err(render_error)?;
    Ok(Html(html))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    match state.guard.login(&form.username, &form.password) {
        Some(token) => Ok((
            AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
            Redirect::to("/"),
        )
            .into_response()),
        None => {
            let html = pages::render_login(&state.templates, Some("Invalid username or password"))
                .map_err(render_error)?;
            Ok((StatusCode::UNAUTHORIZED, Html(html)).into_response())
        }
    }
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.guard.logout(&token);
    }
    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Redirect::to("/"),
    )
        .into_response()
}

// ---- Form mutations (login-gated by the router) ----

pub async fn add_task(
    State(state): State<AppState>,
    Form(form): Form<AddTaskForm>,
) -> ApiResult<Redirect> {
    if form.content.trim().is_empty() {
        // Empty submissions are a no-op; the page just reloads.
        return Ok(Redirect::to("/"));
    }

    state.store_write().add(TaskDraft {
        content: form.content,
        priority: form.priority,
        due_date: due_date_or_none(form.due_date.as_deref()),
        created_date: state.clock.now(),
    })?;
    Ok(Redirect::to("/"))
}

pub async fn edit_task(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Form(form): Form<EditTaskForm>,
) -> ApiResult<Redirect> {
    state.store_write().update(
        id,
        TaskPatch {
            content: Some(form.content),
            ..TaskPatch::default()
        },
    )?;
    Ok(Redirect::to("/"))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Redirect> {
    state.store_write().toggle(id)?;
    Ok(Redirect::to("/"))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Redirect> {
    state.store_write().delete(id)?;
    Ok(Redirect::to("/"))
}

// ---- JSON API ----

pub async fn api_list_tasks(
    State(state): State<AppState>,
    Query(params): Query<ViewParams>,
) -> ApiResult<Json<TaskListResponse>> {
    let query = params.to_query(state.clock.now());
    let tasks = state.store_read().all()?;
    let view = query.run(&tasks);
    Ok(Json(TaskListResponse::new(&view, &query)))
}

pub async fn api_create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(request) =
        payload.map_err(|_| ApiError::validation("Expected application/json"))?;

    let now = state.clock.now();
    let task = state.store_write().add(TaskDraft {
        content: request.content,
        priority: request.priority,
        due_date: due_date_or_none(request.due_date.as_deref()),
        created_date: now,
    })?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from_task(&task, now))))
}

pub async fn api_get_task(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state.store_read().get(id)?;
    Ok(Json(TaskResponse::from_task(&task, state.clock.now())))
}

pub async fn api_update_task(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let Json(request) =
        payload.map_err(|_| ApiError::validation("Expected application/json"))?;

    let mut patch = TaskPatch {
        content: request.content,
        completed: request.completed,
        priority: request.priority,
        due_date: None,
    };
    match request.due_date {
        None => {}
        // Explicit null clears the deadline.
        Some(None) => patch.due_date = Some(None),
        Some(Some(raw)) => match parse_due_date(&raw) {
            Ok(parsed) => patch.due_date = Some(Some(parsed)),
            // Parse failure retains the previous value.
            Err(err) => warn!("keeping previous due date: {err}"),
        },
    }

    let task = state.store_write().update(id, patch)?;
    Ok(Json(TaskResponse::from_task(&task, state.clock.now())))
}

pub async fn api_delete_task(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> ApiResult<Json<serde_json::Value>> {
    state.store_write().delete(id)?;
    Ok(Json(json!({ "result": "deleted" })))
}
