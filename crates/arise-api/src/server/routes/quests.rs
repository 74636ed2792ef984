async fn get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserDocument>, HttpApiError> {
    let session = require_session(&state, &headers)?;
    Ok(Json(state.documents.get_document(&session.email)))
}

fn validate_completion(request: &CompleteTaskRequest) -> Result<(&str, &str, f64), HttpApiError> {
    let quest_id = request
        .quest_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(HttpApiError::invalid_data)?;
    let task_id = request
        .task_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(HttpApiError::invalid_data)?;
    let progress = request
        .progress
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(HttpApiError::invalid_data)?;

    Ok((quest_id, task_id, progress))
}

async fn complete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CompleteTaskRequest>, JsonRejection>,
) -> Result<Json<UpdateResponse>, HttpApiError> {
    let session = require_session(&state, &headers)?;
    let Json(request) = payload.map_err(|_| HttpApiError::invalid_data())?;
    let (quest_id, task_id, progress) = validate_completion(&request)?;

    let document = state
        .documents
        .load(&session.email)
        .map_err(|err| {
            error!("loading document for {} failed: {err}", session.email);
            HttpApiError::internal("Failed to update quest progress")
        })?
        .ok_or_else(HttpApiError::not_found)?;

    let was_completed = document
        .quests
        .iter()
        .find(|quest| quest.id == quest_id)
        .map(quest_completed)
        .unwrap_or(false);

    let quests = apply_task_progress(&document.quests, quest_id, task_id, progress);

    let now_completed = quests
        .iter()
        .find(|quest| quest.id == quest_id)
        .map(|quest| quest.is_completed)
        .unwrap_or(false);

    // Completion is derived from the task list, never taken from the
    // caller's claim.
    if request.is_completed == Some(true) && !now_completed {
        warn!(
            "client claimed completion of quest {quest_id} for {}, tasks disagree",
            session.email
        );
    }

    // Stats advance only on the not-completed -> completed transition, so
    // replaying a completion cannot compound the reward.
    let written = if now_completed && !was_completed {
        let patch = request.stat_updates.unwrap_or_default();
        let stats = apply_stat_update(&document.stats, &patch);
        state.documents.update_progress(&session.email, &quests, &stats)
    } else {
        state.documents.update_quests(&session.email, &quests)
    };

    if !written {
        return Err(HttpApiError::internal("Failed to update quest progress"));
    }

    Ok(Json(UpdateResponse::ok()))
}

async fn replace_quests(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ReplaceQuestsRequest>, JsonRejection>,
) -> Result<Json<UpdateResponse>, HttpApiError> {
    let session = require_session(&state, &headers)?;
    let Json(request) = payload.map_err(|_| HttpApiError::invalid_data())?;

    let Some(quests) = request.quests else {
        return Err(HttpApiError::invalid_data());
    };
    let quests = normalize(quests);

    match state.documents.load(&session.email) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(HttpApiError::not_found()),
        Err(err) => {
            error!("loading document for {} failed: {err}", session.email);
            return Err(HttpApiError::internal("Failed to update quests"));
        }
    }

    if !state.documents.update_quests(&session.email, &quests) {
        return Err(HttpApiError::internal("Failed to update quests"));
    }

    Ok(Json(UpdateResponse::ok()))
}
