use axum::{
    extract::{Extension, Form, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::{num::ParseIntError, sync::Arc};
use tracing::*;

use super::AppState;

const DEFAULT_PAGE_SIZE: usize = 100;

type Failure = (StatusCode, Json<JsonValue>);

fn status_reply(status: StatusCode) -> Failure {
    let text = status.canonical_reason().unwrap_or_default();
    (status, Json(JsonValue::String(text.to_owned())))
}

fn parse_timestamp(raw: &str) -> Result<i64, Failure> {
    raw.parse().map_err(|e| {
        warn!(%raw, "could not parse startTimestamp: {}", e);
        status_reply(StatusCode::BAD_REQUEST)
    })
}

/// Accepts `12` as well as `12,34`.
fn parse_blog_ids(raw: &str) -> Result<Vec<i64>, ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartQuery {
    #[serde(default)]
    start_timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserQuery {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    start_timestamp: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SignupForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BlogsForm {
    #[serde(default)]
    uuid: String,
    #[serde(default, rename = "blogIDs")]
    blog_ids: String,
}

impl BlogsForm {
    fn ids(&self) -> Result<Vec<i64>, Failure> {
        match parse_blog_ids(&self.blog_ids) {
            Ok(ids) if !ids.is_empty() => Ok(ids),
            Ok(_) => {
                warn!("no blog ids given");
                Err(status_reply(StatusCode::BAD_REQUEST))
            }
            Err(e) => {
                warn!(raw = %self.blog_ids, "could not extract blog ids: {}", e);
                Err(status_reply(StatusCode::BAD_REQUEST))
            }
        }
    }
}

pub(crate) async fn home_handler() -> impl IntoResponse {
    Json(StatusCode::OK.canonical_reason().unwrap_or_default())
}

pub(crate) async fn recent_actions_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<StartQuery>,
) -> Result<impl IntoResponse, Failure> {
    info!("recent-actions");

    let start = parse_timestamp(&query.start_timestamp)?;

    let actions = state
        .store
        .query_recent_actions(start, DEFAULT_PAGE_SIZE)
        .map_err(|e| {
            error!("querying recent actions failed: {:?}", e);
            status_reply(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(actions))
}

pub(crate) async fn blogs_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<StartQuery>,
) -> Result<impl IntoResponse, Failure> {
    info!("blogs");

    let start = parse_timestamp(&query.start_timestamp)?;

    let blogs = state
        .store
        .query_all_unique_blogs(start, DEFAULT_PAGE_SIZE)
        .map_err(|e| {
            error!("querying blogs failed: {:?}", e);
            status_reply(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(blogs))
}

pub(crate) async fn blog_comments_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<StartQuery>,
) -> Result<impl IntoResponse, Failure> {
    info!(%id, "blog-comments");

    let start = parse_timestamp(&query.start_timestamp)?;
    let id: i64 = id.parse().map_err(|e| {
        warn!(%id, "could not parse blog id: {}", e);
        status_reply(StatusCode::BAD_REQUEST)
    })?;

    let comments = state
        .store
        .query_comments_from_blog(id, start, DEFAULT_PAGE_SIZE)
        .map_err(|e| {
            error!(%id, "querying comments failed: {:?}", e);
            status_reply(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(comments))
}

pub(crate) async fn signup_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<impl IntoResponse, Failure> {
    info!("signup");

    let user = state
        .register_user(&form.username, &form.password)
        .map_err(|e| {
            error!(username = %form.username, "could not register user: {:?}", e);
            status_reply(StatusCode::BAD_REQUEST)
        })?;

    Ok(Json(user))
}

pub(crate) async fn subscribe_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<BlogsForm>,
) -> Result<impl IntoResponse, Failure> {
    info!(uuid = %form.uuid, "subscribe");

    let ids = form.ids()?;

    state
        .store
        .subscribe_to_blogs(&form.uuid, &ids)
        .map_err(|e| {
            error!(uuid = %form.uuid, ?ids, "could not subscribe: {:?}", e);
            status_reply(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(StatusCode::OK.canonical_reason().unwrap_or_default()))
}

pub(crate) async fn unsubscribe_handler(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<BlogsForm>,
) -> Result<impl IntoResponse, Failure> {
    info!(uuid = %form.uuid, "unsubscribe");

    let ids = form.ids()?;

    state
        .store
        .unsubscribe_from_blogs(&form.uuid, &ids)
        .map_err(|e| {
            error!(uuid = %form.uuid, ?ids, "could not unsubscribe: {:?}", e);
            status_reply(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(StatusCode::OK.canonical_reason().unwrap_or_default()))
}

pub(crate) async fn user_recent_actions_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Result<impl IntoResponse, Failure> {
    info!(uuid = %query.uuid, "user-recent-actions");

    let start = parse_timestamp(&query.start_timestamp)?;

    let actions = state
        .store
        .query_recent_actions_for_user(&query.uuid, start, DEFAULT_PAGE_SIZE)
        .map_err(|e| {
            error!(uuid = %query.uuid, "querying recent actions failed: {:?}", e);
            status_reply(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    Ok(Json(actions))
}
