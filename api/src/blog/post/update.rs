use axum::{
    Json, debug_handler,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    App,
    blog::models::post::{Post, PostStatus, UpdatePost},
    error::AppError,
    identity::AuthUser,
};

#[derive(Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
}

impl PostPatch {
    fn validate(&mut self) -> Result<(), &'static str> {
        if let Some(mut title) = self.title.take() {
            title = title.trim().to_string();

            if title.is_empty() {
                return Err("No title provided");
            }

            if title.chars().count() > 100 {
                return Err("Max title length is 100 characters");
            }

            self.title = Some(title);
        }

        if let Some(status) = &self.status {
            PostStatus::parse(status).ok_or("Unknown post status")?;
        }

        Ok(())
    }
}

#[debug_handler]
pub async fn update_post(
    State(ctx): State<App>,
    Path(id): Path<i32>,
    AuthUser(actor): AuthUser,
    crate::json::Json(mut patch): crate::json::Json<PostPatch>,
) -> Result<Json<Post>, AppError> {
    patch.validate().map_err(|e| (e, StatusCode::BAD_REQUEST))?;

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

    let updated = Post::update(
        &mut conn,
        id,
        UpdatePost {
            title: patch.title,
            body: patch.body,
            status: patch.status,
            updated_at: Some(chrono::Utc::now().naive_utc()),
        },
    )
    .await?;

    Ok(Json(updated))
}
