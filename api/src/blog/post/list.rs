use axum::{
    Json, debug_handler,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::{App, blog::models::post::Post, error::AppError};

#[derive(Deserialize)]
pub struct Queries {
    /// Prefix to match post slugs against, e.g. `?search=rust-2`.
    search: Option<String>,
}

/// Listing shape: identity, absolute URL, author name and the total number of
/// comments (replies included).
#[derive(Serialize)]
pub struct PostSummary {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub author: String,
    pub comments: i64,
}

#[debug_handler]
pub async fn list_posts(
    State(ctx): State<App>,
    Query(q): Query<Queries>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    let mut conn = ctx.diesel.get().await?;

    let posts = Post::list(&mut conn, q.search.as_deref()).await?;

    let ids: Vec<i32> = posts.iter().map(|(post, _)| post.id).collect();
    let counts = Post::comment_counts(&mut conn, &ids).await?;

    let summaries = posts
        .into_iter()
        .map(|(post, author)| PostSummary {
            url: format!("{}/posts/{}", ctx.config.base_url, post.id),
            comments: counts.get(&post.id).copied().unwrap_or(0),
            id: post.id,
            title: post.title,
            author: author.display_name(),
        })
        .collect();

    Ok(Json(summaries))
}
