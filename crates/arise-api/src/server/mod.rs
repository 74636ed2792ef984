use std::fmt;
use std::net::SocketAddr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Request, State};
use axum::http::header::{HeaderName, HeaderValue, AUTHORIZATION};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use contracts::{
    ApiError, CompleteTaskRequest, ReplaceQuestsRequest, SessionResponse, SignInRequest,
    UpdateResponse, UserDocument,
};
use tokio::net::TcpListener;
use tracing::{error, warn};

use arise_core::quest::{apply_task_progress, normalize, quest_completed};
use arise_core::stats::apply_stat_update;

use crate::sessions::{SessionUser, Sessions};
use crate::store::Documents;

include!("error.rs");
include!("state.rs");
include!("routes/auth.rs");
include!("routes/quests.rs");
include!("util.rs");

pub async fn serve(addr: SocketAddr, documents: Documents) -> Result<(), ServerError> {
    let state = AppState::new(documents);
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/session", post(sign_in).delete(sign_out))
        .route("/api/profile", get(get_profile))
        .route("/api/quests/complete", post(complete_task))
        .route("/api/quests/update", post(replace_quests))
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

async fn cors_middleware(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = Response::new(axum::body::Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return response;
    }

    let mut response = next.run(request).await;
    apply_cors_headers(response.headers_mut());
    response
}
