use axum::{
    Json, debug_handler,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    App,
    blog::models::post::{NewPost, Post, PostStatus, slugify},
    error::AppError,
    identity::AuthUser,
};

#[debug_handler]
pub async fn create_post(
    State(ctx): State<App>,
    AuthUser(author): AuthUser,
    crate::json::Json(mut post): crate::json::Json<PostSubmission>,
) -> Result<Json<Post>, AppError> {
    let status = post.validate().map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let created = Post::create(
        &mut conn,
        NewPost {
            slug: slugify(&post.title),
            title: post.title,
            body: post.body,
            status: status.as_str().to_owned(),
            author_id: author.id,
        },
    )
    .await?;

    Ok(Json(created))
}

#[derive(Deserialize)]
pub struct PostSubmission {
    pub title: String,
    pub body: String,
    pub status: String,
}

impl PostSubmission {
    fn validate(&mut self) -> Result<PostStatus, &'static str> {
        self.title = self.title.trim().to_string();

        if self.title.is_empty() {
            return Err("No title provided");
        }

        if self.title.chars().count() > 100 {
            return Err("Max title length is 100 characters");
        }

        PostStatus::parse(&self.status).ok_or("Unknown post status")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn submission(title: &str) -> PostSubmission {
        PostSubmission {
            title: title.to_string(),
            body: "body".to_string(),
            status: "published".to_string(),
        }
    }

    #[test]
    fn test_title_of_100_characters_is_accepted() {
        let mut post = submission(&"a".repeat(100));
        assert_eq!(post.validate(), Ok(PostStatus::Published));
    }

    #[test]
    fn test_title_of_101_characters_is_rejected() {
        let mut post = submission(&"a".repeat(101));
        assert_eq!(post.validate(), Err("Max title length is 100 characters"));
    }

    #[test]
    fn test_title_length_counts_characters_not_bytes() {
        // 100 characters, way more than 100 bytes
        let mut post = submission(&"å".repeat(100));
        assert!(post.validate().is_ok());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let mut post = submission("   ");
        assert_eq!(post.validate(), Err("No title provided"));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let mut post = submission("Hello");
        post.status = "archived".to_string();
        assert_eq!(post.validate(), Err("Unknown post status"));
    }
}
