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
pub async fn reply_to_comment(
    State(ctx): State<App>,
    Path((post_id, comment_id)): Path<(i32, i32)>,
    AuthUser(author): AuthUser,
    crate::json::Json(mut reply): crate::json::Json<CommentSubmission>,
) -> Result<Json<Comment>, AppError> {
    reply.validate().map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let post = Post::get(&mut conn, post_id)
        .await?
        .ok_or(("Post not found", StatusCode::NOT_FOUND))?;

    let target = Comment::get(&mut conn, comment_id)
        .await?
        .ok_or(("Comment not found", StatusCode::NOT_FOUND))?;

    if target.post_id != post.id {
        return Err((
            "You're replying to a comment that does not belong to this post",
            StatusCode::BAD_REQUEST,
        ))?;
    }

    if !Comment::reply_chain_is_acyclic(&mut conn, &target).await? {
        return Err((
            "The reply chain of the target comment contains a cycle",
            StatusCode::BAD_REQUEST,
        ))?;
    }

    let created = Comment::create(
        &mut conn,
        NewComment {
            post_id: post.id,
            reply_to: Some(target.id),
            author_id: author.id,
            body: reply.body,
        },
    )
    .await?;

    Ok(Json(created))
}
