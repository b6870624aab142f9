//! Turns the flat comment rows of a post into the nested reply tree the API
//! renders. One query loads the whole arena; assembly is pure code after that,
//! so a thread is either rendered completely or not at all.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel_async::AsyncPgConnection;
use serde::Serialize;

use crate::blog::models::comment::Comment;

/// One rendered comment in a thread. `replies` holds the comments whose
/// `reply_to` points at this one, in insertion order; it is always present and
/// empty for leaf comments.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct CommentNode {
    pub id: i32,
    pub post_id: i32,
    pub author: String,
    pub body: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub reply_to: Option<i32>,
    pub replies: Vec<CommentNode>,
}

#[derive(thiserror::Error, Debug)]
pub enum ThreadError {
    #[error("failed to load the comments of the thread: {0}")]
    Fetch(#[from] diesel::result::Error),

    #[error("{0} comments could not be attached to the thread (dangling or cyclic reply links)")]
    Unattachable(usize),
}

/// The full comment tree of a post: top-level comments in insertion order,
/// each with its replies nested recursively.
pub async fn for_post(
    conn: &mut AsyncPgConnection,
    post_id: i32,
) -> Result<Vec<CommentNode>, ThreadError> {
    let rows = Comment::for_post(conn, post_id)
        .await?
        .into_iter()
        .map(|(comment, author)| (comment, author.display_name()))
        .collect();

    assemble(rows)
}

/// Builds the nested tree out of flat `(comment, author name)` rows. Rows must
/// arrive in insertion order (id ascending); every level of the tree keeps
/// that order.
///
/// Every row is consumed exactly once, so rows that cannot be reached from a
/// top-level comment — a reply link pointing at a missing comment, or a cycle
/// among rows — are left over at the end and turn the whole assembly into an
/// error instead of a silently truncated tree.
pub fn assemble(rows: Vec<(Comment, String)>) -> Result<Vec<CommentNode>, ThreadError> {
    let total = rows.len();

    let mut by_target: HashMap<Option<i32>, Vec<(Comment, String)>> = HashMap::new();
    for row in rows {
        by_target.entry(row.0.reply_to).or_default().push(row);
    }

    let roots = by_target.remove(&None).unwrap_or_default();
    let mut consumed = 0;
    let tree = attach_replies(roots, &mut by_target, &mut consumed);

    if consumed != total {
        return Err(ThreadError::Unattachable(total - consumed));
    }

    Ok(tree)
}

fn attach_replies(
    level: Vec<(Comment, String)>,
    by_target: &mut HashMap<Option<i32>, Vec<(Comment, String)>>,
    consumed: &mut usize,
) -> Vec<CommentNode> {
    level
        .into_iter()
        .map(|(comment, author)| {
            *consumed += 1;

            let replies = by_target.remove(&Some(comment.id)).unwrap_or_default();
            let replies = attach_replies(replies, by_target, consumed);

            CommentNode {
                id: comment.id,
                post_id: comment.post_id,
                author,
                body: comment.body,
                created_at: comment.created_at,
                updated_at: comment.updated_at,
                reply_to: comment.reply_to,
                replies,
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    // Helper function to create a mock comment row
    fn row(id: i32, reply_to: Option<i32>, author: &str) -> (Comment, String) {
        let at = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::try_minutes(id as i64).unwrap();

        (
            Comment {
                id,
                post_id: 1,
                reply_to,
                author_id: id,
                body: format!("Body of comment {}", id),
                created_at: at,
                updated_at: at,
            },
            author.to_string(),
        )
    }

    fn count_nodes(nodes: &[CommentNode]) -> usize {
        nodes
            .iter()
            .map(|n| 1 + count_nodes(&n.replies))
            .sum::<usize>()
    }

    #[test]
    fn test_assemble_with_no_comments() {
        let tree = assemble(vec![]).unwrap();
        assert!(tree.is_empty(), "Expected no comments in the tree");
    }

    #[test]
    fn test_leaf_comments_render_empty_replies() {
        let tree = assemble(vec![row(1, None, "alice")]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].replies, vec![], "Expected an empty replies list");
    }

    #[test]
    fn test_reply_nests_under_its_target() {
        // bob comments on the post, alice replies to bob
        let tree = assemble(vec![row(1, None, "bob"), row(2, Some(1), "alice")]).unwrap();

        assert_eq!(tree.len(), 1, "Expected one top-level comment");
        assert_eq!(tree[0].author, "bob");
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].author, "alice");
        assert_eq!(tree[0].replies[0].reply_to, Some(1));
        assert_eq!(tree[0].replies[0].replies, vec![]);
    }

    #[test]
    fn test_insertion_order_is_kept_at_every_level() {
        let tree = assemble(vec![
            row(1, None, "a"),
            row(2, None, "b"),
            row(3, Some(1), "c"),
            row(4, Some(2), "d"),
            row(5, Some(1), "e"),
        ])
        .unwrap();

        let top: Vec<i32> = tree.iter().map(|n| n.id).collect();
        assert_eq!(top, vec![1, 2], "Top level should keep insertion order");

        let replies_of_1: Vec<i32> = tree[0].replies.iter().map(|n| n.id).collect();
        assert_eq!(replies_of_1, vec![3, 5]);

        let replies_of_2: Vec<i32> = tree[1].replies.iter().map(|n| n.id).collect();
        assert_eq!(replies_of_2, vec![4]);
    }

    #[test]
    fn test_every_comment_appears_exactly_once() {
        let rows = vec![
            row(1, None, "a"),
            row(2, Some(1), "b"),
            row(3, Some(2), "c"),
            row(4, Some(2), "d"),
            row(5, None, "e"),
            row(6, Some(5), "f"),
        ];
        let total = rows.len();

        let tree = assemble(rows).unwrap();
        assert_eq!(count_nodes(&tree), total);
    }

    #[test]
    fn test_deep_reply_chain_assembles() {
        let mut rows = vec![row(1, None, "a")];
        for id in 2..=200 {
            rows.push(row(id, Some(id - 1), "a"));
        }

        let tree = assemble(rows).unwrap();

        let mut depth = 0;
        let mut cursor = &tree;
        while let Some(node) = cursor.first() {
            depth += 1;
            cursor = &node.replies;
        }
        assert_eq!(depth, 200);
    }

    #[test]
    fn test_dangling_reply_link_fails_assembly() {
        // comment 3 replies to a comment that is not in the arena
        let result = assemble(vec![row(1, None, "a"), row(3, Some(2), "b")]);

        match result {
            Err(ThreadError::Unattachable(n)) => assert_eq!(n, 1),
            other => panic!("Expected an unattachable-rows error, got {:?}", other),
        }
    }

    #[test]
    fn test_cyclic_reply_links_fail_assembly() {
        // corrupted data: 1 and 2 reply to each other, so neither is reachable
        // from the top level
        let result = assemble(vec![
            row(1, Some(2), "a"),
            row(2, Some(1), "b"),
            row(3, None, "c"),
        ]);

        match result {
            Err(ThreadError::Unattachable(n)) => assert_eq!(n, 2),
            other => panic!("Expected an unattachable-rows error, got {:?}", other),
        }
    }
}
