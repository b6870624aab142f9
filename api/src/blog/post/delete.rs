use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{App, blog::models::post::Post, error::AppError, identity::AuthUser};

#[debug_handler]
pub async fn delete_post(
    State(ctx): State<App>,
    Path(id): Path<i32>,
    AuthUser(actor): AuthUser,
) -> Result<(), AppError> {
    let mut conn = ctx.diesel.get().await?;

    let post = Post::get(&mut conn, id)
        .await?
        .ok_or(("Post not found", StatusCode::NOT_FOUND))?;

    if post.author_id != actor.id {
        return Err((
            "You are not the owner of this post",
            StatusCode::FORBIDDEN,
        ))?;
    }

    // comments go with the post through the foreign key cascade
    Post::delete(&mut conn, id).await?;

    Ok(())
}
