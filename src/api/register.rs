//! Registration API endpoint.
//!
//! Registration is where the founder election runs: the handler snapshots
//! "does any member exist" before the insert, and the decided title/flag are
//! persisted atomically with the new profile.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::bootstrap;
use crate::errors::AppError;
use crate::models::{FamilyMember, RegisterRequest};
use crate::AppState;

/// POST /api/register - Register a new user and elect their role.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<FamilyMember> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    // Validate required fields
    if request.first_name.trim().is_empty() {
        return error(
            AppError::Validation("First name is required".to_string()),
            revision_id,
        );
    }
    if request.last_name.trim().is_empty() {
        return error(
            AppError::Validation("Last name is required".to_string()),
            revision_id,
        );
    }
    if request.email.trim().is_empty() {
        return error(
            AppError::Validation("Email is required".to_string()),
            revision_id,
        );
    }

    // The existence check must succeed before any role is decided; a failed
    // read aborts the registration instead of defaulting to "first user".
    let has_members = match state.repo.has_members().await {
        Ok(has_members) => has_members,
        Err(e) => return error(e, revision_id),
    };

    let decision = bootstrap::decide(has_members);

    match state.repo.create_registrant(&request, &decision).await {
        Ok(member) => {
            if member.is_patriarch {
                tracing::info!(member_id = %member.id, "First registrant elected patriarch");
            }
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(member, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
