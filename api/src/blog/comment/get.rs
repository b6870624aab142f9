use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    App,
    blog::models::post::Post,
    blog::thread::{self, CommentNode},
    error::AppError,
};

/// The full comment thread of a post, top-level comments first, replies
/// nested. A storage failure mid-assembly fails the whole request; this never
/// serves a partial tree.
#[debug_handler]
pub async fn get_comments(
    State(ctx): State<App>,
    Path(post_id): Path<i32>,
) -> Result<Json<Vec<CommentNode>>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let post = Post::get(&mut conn, post_id)
        .await?
        .ok_or(("Post not found", StatusCode::NOT_FOUND))?;

    let tree = thread::for_post(&mut conn, post.id).await?;

    Ok(Json(tree))
}
