use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::Extension,
    routing::{get, get_service, post},
    Router,
};
use tower_http::{
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

use super::{handlers::*, state::AppState};

pub const V1_PUBLIC: &str = "/api/v1/public";

pub fn create_api_router() -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/activity/recent-actions", get(recent_actions_handler))
        .route("/blogs", get(blogs_handler))
        .route("/blogs/:id/comments", get(blog_comments_handler))
        .route("/user/signup", post(signup_handler))
        .route("/user/blogs/subscribe", post(subscribe_handler))
        .route("/user/blogs/unsubscribe", post(unsubscribe_handler))
        .route(
            "/user/activity/recent-actions",
            get(user_recent_actions_handler),
        )
}

pub fn create_router(assets_dir: PathBuf, app_state: Arc<AppState>) -> Router {
    Router::new()
        .nest(V1_PUBLIC, create_api_router())
        .fallback(get_service(
            ServeDir::new(assets_dir).append_index_html_on_directories(true),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(Extension(app_state))
}
