#[derive(Clone)]
struct AppState {
    documents: Documents,
    sessions: Sessions,
}

impl AppState {
    fn new(documents: Documents) -> Self {
        Self {
            documents,
            sessions: Sessions::new(),
        }
    }
}

fn require_session(state: &AppState, headers: &HeaderMap) -> Result<SessionUser, HttpApiError> {
    let Some(token) = bearer_token(headers) else {
        return Err(HttpApiError::unauthorized());
    };

    state
        .sessions
        .resolve(token)
        .ok_or_else(HttpApiError::unauthorized)
}
