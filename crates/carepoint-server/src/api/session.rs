use axum::{
    extract::{Path, State},
    Extension, Json,
};
use carepoint_session::{SessionContext, SessionError};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(uid): Path<String>,
) -> Result<Json<ApiResponse<SessionContext>>, ApiError> {
    let Some(client) = state.profiles.as_ref() else {
        return Err(ApiError::unavailable("Profile store is not configured"));
    };

    let context = SessionContext::establish(client, &uid, state.profile_retry)
        .await
        .map_err(|e| match e {
            SessionError::InvalidUserId(_) => ApiError::bad_request(e.to_string()),
            other => {
                tracing::error!(request_id = %req_id.0, error = %other, "session lookup failed");
                ApiError::internal("session lookup failed")
            }
        })?;

    Ok(Json(ApiResponse {
        data: context,
        meta: ResponseMeta::new(req_id.0),
    }))
}
