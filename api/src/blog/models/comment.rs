use std::collections::HashSet;

use chrono::NaiveDateTime;
use diesel::QueryResult;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;

use crate::identity::models::identity::Identity;
use crate::schema::{comments, identities};

#[derive(Queryable, Selectable, Identifiable, Debug, Serialize, Clone)]
#[diesel(table_name = crate::schema::comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Comment {
    pub id: i32,
    pub post_id: i32,
    /// The comment this one replies to. `None` for top-level comments. Only
    /// ever points at a comment of the same post, and only set at creation.
    pub reply_to: Option<i32>,
    pub author_id: i32,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::comments)]
pub struct NewComment {
    pub post_id: i32,
    pub reply_to: Option<i32>,
    pub author_id: i32,
    pub body: String,
}

impl Comment {
    pub async fn get(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<Option<Comment>> {
        comments::table.find(id).first(conn).await.optional()
    }

    /// Composite lookup: the comment with `id` belonging to `post_id`. A
    /// comment of another post resolves to `None`, same as a missing one.
    pub async fn get_in_post(
        conn: &mut AsyncPgConnection,
        post_id: i32,
        id: i32,
    ) -> QueryResult<Option<Comment>> {
        comments::table
            .filter(comments::id.eq(id))
            .filter(comments::post_id.eq(post_id))
            .first(conn)
            .await
            .optional()
    }

    /// Every comment of the post with its author, in insertion order. The
    /// thread assembler turns this flat arena into the nested tree.
    pub async fn for_post(
        conn: &mut AsyncPgConnection,
        post_id: i32,
    ) -> QueryResult<Vec<(Comment, Identity)>> {
        comments::table
            .inner_join(identities::table)
            .filter(comments::post_id.eq(post_id))
            .select((Comment::as_select(), Identity::as_select()))
            .order(comments::id.asc())
            .load(conn)
            .await
    }

    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_comment: NewComment,
    ) -> QueryResult<Comment> {
        diesel::insert_into(comments::table)
            .values(&new_comment)
            .returning(Comment::as_returning())
            .get_result(conn)
            .await
    }

    pub async fn update_body(
        conn: &mut AsyncPgConnection,
        id: i32,
        body: String,
    ) -> QueryResult<Comment> {
        diesel::update(comments::table.find(id))
            .set((
                comments::body.eq(body),
                comments::updated_at.eq(diesel::dsl::now),
            ))
            .returning(Comment::as_returning())
            .get_result(conn)
            .await
    }

    /// Replies cascade with their target, enforced by the foreign key.
    pub async fn delete(conn: &mut AsyncPgConnection, id: i32) -> QueryResult<usize> {
        diesel::delete(comments::table.find(id)).execute(conn).await
    }

    /// Walks reply links from `start` toward the thread root. Returns false
    /// when a link revisits a comment, i.e. the chain contains a cycle. The
    /// API never creates one (targets must exist before the reply, and reply
    /// links are immutable), so a false here means corrupted data.
    pub async fn reply_chain_is_acyclic(
        conn: &mut AsyncPgConnection,
        start: &Comment,
    ) -> QueryResult<bool> {
        let mut seen = HashSet::from([start.id]);
        let mut cursor = start.reply_to;

        while let Some(id) = cursor {
            if !seen.insert(id) {
                return Ok(false);
            }

            let target = comments::table
                .filter(comments::id.eq(id))
                .select(comments::reply_to)
                .first::<Option<i32>>(conn)
                .await
                .optional()?;

            match target {
                Some(next) => cursor = next,
                // dangling link; the assembler reports those
                None => break,
            }
        }

        Ok(true)
    }
}
