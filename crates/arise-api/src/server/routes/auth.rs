async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, HttpApiError> {
    let Json(request) = payload.map_err(|_| HttpApiError::invalid_data())?;

    let Some(email) = request.email.filter(|email| !email.trim().is_empty()) else {
        return Err(HttpApiError::invalid_data());
    };
    let name = request.name.unwrap_or_default();

    // First sign-in provisions the document. A cold store only costs a
    // warning; the session itself still works against the fallback reads.
    if !state.documents.create_document(&email, &name) {
        warn!("document for {email} could not be provisioned at sign-in");
    }

    let token = state.sessions.issue(&email, &name);
    Ok(Json(SessionResponse { token, email }))
}

async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UpdateResponse>, HttpApiError> {
    let Some(token) = bearer_token(&headers) else {
        return Err(HttpApiError::unauthorized());
    };

    if !state.sessions.revoke(token) {
        return Err(HttpApiError::unauthorized());
    }

    Ok(Json(UpdateResponse::ok()))
}
