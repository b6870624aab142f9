use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    App,
    blog::comment::CommentSubmission,
    blog::models::{
        comment::{Comment, NewComment},
        post::Post,
    },
    error::AppError,
    identity::AuthUser,
};

#[debug_handler]
pub async fn create_comment(
    State(ctx): State<App>,
    Path(post_id): Path<i32>,
    AuthUser(author): AuthUser,
    crate::json::Json(mut comment): crate::json::Json<CommentSubmission>,
) -> Result<Json<Comment>, AppError> {
    comment.validate().map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let post = Post::get(&mut conn, post_id)
        .await?
        .ok_or(("Post not found", StatusCode::NOT_FOUND))?;

    let created = Comment::create(
        &mut conn,
        NewComment {
            post_id: post.id,
            reply_to: None,
            author_id: author.id,
            body: comment.body,
        },
    )
    .await?;

    Ok(Json(created))
}
