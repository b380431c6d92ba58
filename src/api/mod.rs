mod bookings;
mod chatbot;
mod dashboard;
mod extract;
mod health;
mod leads;
mod login;
mod properties;
mod uploads;

pub use dashboard::DashboardStats;
pub use uploads::UploadSettings;

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request},
    http::{header, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::auth::TokenSigner;
use crate::config::Config;
use crate::error::ApiError;
use crate::records::Repository;
use crate::store::Store;

/// Shared state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub repo: Repository,
    pub signer: Arc<TokenSigner>,
    pub uploads: Arc<UploadSettings>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &Config) -> Self {
        Self {
            repo: Repository::new(store),
            signer: Arc::new(TokenSigner::new(&config.jwt_secret)),
            uploads: Arc::new(UploadSettings {
                dir: config.upload_dir.clone(),
                public_base_url: config.public_base_url.clone(),
            }),
        }
    }
}

/// Full application router: `/api/*` JSON routes plus `/uploads` static files
pub fn router(state: AppState) -> Router {
    let upload_dir = state.uploads.dir.clone();

    Router::new()
        .merge(health::router())
        .merge(login::router())
        .merge(properties::router())
        .merge(bookings::router())
        .merge(leads::router())
        .merge(chatbot::router())
        .merge(dashboard::router())
        .merge(uploads::router())
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(middleware::from_fn(answer_options))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Any OPTIONS request succeeds with an empty body
async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}
