use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::QueryResult;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use crate::identity::models::identity::Identity;
use crate::schema::{comments, identities, posts};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Clone)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: String,
    pub author_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: String,
    pub author_id: i32,
}

#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::posts)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Publication state of a post. Stored as text; unknown values coming in over
/// the API are rejected at the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

impl Post {
    pub async fn get(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Post>> {
        posts::table.find(id).first(conn).await.optional()
    }

    pub async fn get_with_author(
        conn: &mut AsyncPgConnection,
        id: i32,
    ) -> QueryResult<Option<(Post, Identity)>> {
        posts::table
            .inner_join(identities::table)
            .filter(posts::id.eq(id))
            .select((Post::as_select(), Identity::as_select()))
            .first(conn)
            .await
            .optional()
    }

    /// Posts with their authors, in insertion order. `slug_prefix` narrows the
    /// listing to posts whose slug starts with it.
    pub async fn list(
        conn: &mut AsyncPgConnection,
        slug_prefix: Option<&str>,
    ) -> QueryResult<Vec<(Post, Identity)>> {
        let mut query = posts::table
            .inner_join(identities::table)
            .select((Post::as_select(), Identity::as_select()))
            .order(posts::id.asc())
            .into_boxed();

        if let Some(prefix) = slug_prefix {
            query = query.filter(posts::slug.like(format!("{}%", escape_like(prefix))));
        }

        query.load(conn).await
    }

    /// Total comment count per post (replies included), for the posts in
    /// `ids`. Posts without comments have no entry.
    pub async fn comment_counts(
        conn: &mut AsyncPgConnection,
        ids: &[i32],
    ) -> QueryResult<HashMap<i32, i64>> {
        let rows: Vec<(i32, i64)> = comments::table
            .filter(comments::post_id.eq_any(ids))
            .group_by(comments::post_id)
            .select((comments::post_id, diesel::dsl::count_star()))
            .load(conn)
            .await?;

        Ok(rows.into_iter().collect())
    }

    pub async fn create(conn: &mut AsyncPgConnection, new_post: NewPost) -> QueryResult<Post> {
        diesel::insert_into(posts::table)
            .values(&new_post)
            .returning(Post::as_returning())
            .get_result(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        id: i32,
        changes: UpdatePost,
    ) -> QueryResult<Post> {
        diesel::update(posts::table.find(id))
            .set(&changes)
            .returning(Post::as_returning())
            .get_result(conn)
            .await
    }

    /// The post's comments go with it, enforced by the foreign key cascade.
    pub async fn delete(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
        diesel::delete(posts::table.find(id)).execute(conn).await
    }
}

/// Identifier derived from the post title at creation time. Stable afterwards,
/// so prefix search keys stay valid when a title is edited.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_dash = true;

    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

fn escape_like(fragment: &str) -> String {
    fragment
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_slugify_collapses_punctuation_and_whitespace() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("Rust 2024: what's new?"), "rust-2024-what-s-new");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only_titles() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_status_round_trips_through_storage_text() {
        assert_eq!(PostStatus::parse("draft"), Some(PostStatus::Draft));
        assert_eq!(PostStatus::parse("published"), Some(PostStatus::Published));
        assert_eq!(PostStatus::Published.as_str(), "published");
    }

    #[test]
    fn test_status_rejects_unknown_values() {
        assert_eq!(PostStatus::parse("archived"), None);
        assert_eq!(PostStatus::parse("Published"), None);
        assert_eq!(PostStatus::parse(""), None);
    }

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
