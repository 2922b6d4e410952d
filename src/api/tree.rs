//! Family tree API endpoint.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::TreeNode;
use crate::tree;
use crate::AppState;

/// GET /api/tree - Build and return the family tree.
///
/// An empty roster is a normal state, not an error: the data field is null
/// and the frontend renders its onboarding view.
pub async fn get_tree(State(state): State<AppState>) -> ApiResult<Option<TreeNode>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_members().await {
        Ok(members) => success(tree::build_tree(&members), revision_id),
        Err(e) => error(e, revision_id),
    }
}
