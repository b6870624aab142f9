use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{
    App,
    blog::models::post::Post,
    blog::thread::{self, CommentNode},
    error::AppError,
};

#[derive(Serialize)]
pub struct PostDetail {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub status: String,
    pub author: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    /// Top-level comments with their replies nested recursively.
    pub comments: Vec<CommentNode>,
}

#[debug_handler]
pub async fn get_post(
    State(ctx): State<App>,
    Path(id): Path<i32>,
) -> Result<Json<PostDetail>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let (post, author) = Post::get_with_author(&mut conn, id)
        .await?
        .ok_or(("Post not found", StatusCode::NOT_FOUND))?;

    let comments = thread::for_post(&mut conn, post.id).await?;

    Ok(Json(PostDetail {
        id: post.id,
        title: post.title,
        body: post.body,
        status: post.status,
        author: author.display_name(),
        created_at: post.created_at,
        updated_at: post.updated_at,
        comments,
    }))
}
