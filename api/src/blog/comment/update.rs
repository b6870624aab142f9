use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    App, blog::comment::CommentSubmission, blog::models::comment::Comment, error::AppError,
    identity::AuthUser,
};

#[debug_handler]
pub async fn update_comment(
    State(ctx): State<App>,
    Path((post_id, id)): Path<(i32, i32)>,
    AuthUser(actor): AuthUser,
    crate::json::Json(mut patch): crate::json::Json<CommentSubmission>,
) -> Result<Json<Comment>, AppError> {
    patch.validate().map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let comment = Comment::get_in_post(&mut conn, post_id, id)
        .await?
        .ok_or(("Comment not found", StatusCode::NOT_FOUND))?;

    if comment.author_id != actor.id {
        return Err((
            "You are not the owner of this comment",
            StatusCode::FORBIDDEN,
        ))?;
    }

    let updated = Comment::update_body(&mut conn, comment.id, patch.body).await?;

    Ok(Json(updated))
}
