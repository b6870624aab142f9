use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{App, blog::models::comment::Comment, error::AppError, identity::AuthUser};

#[debug_handler]
pub async fn delete_comment(
    State(ctx): State<App>,
    Path((post_id, id)): Path<(i32, i32)>,
    AuthUser(actor): AuthUser,
) -> Result<(), AppError> {
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

    Comment::delete(&mut conn, comment.id).await?;

    Ok(())
}
