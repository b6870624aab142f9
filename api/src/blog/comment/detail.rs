use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{App, blog::models::comment::Comment, error::AppError};

// Lookup is keyed by post + comment id, so a comment can only be addressed
// under the post it belongs to.
#[debug_handler]
pub async fn get_comment(
    State(ctx): State<App>,
    Path((post_id, id)): Path<(i32, i32)>,
) -> Result<Json<Comment>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let comment = Comment::get_in_post(&mut conn, post_id, id)
        .await?
        .ok_or(("Comment not found", StatusCode::NOT_FOUND))?;

    Ok(Json(comment))
}
