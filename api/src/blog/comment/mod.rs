pub mod create;
pub mod delete;
pub mod detail;
pub mod get;
pub mod reply;
pub mod update;

use serde::Deserialize;

/// Body shared by the create, reply and update operations.
#[derive(Deserialize)]
pub struct CommentSubmission {
    pub body: String,
}

impl CommentSubmission {
    fn validate(&mut self) -> Result<(), &'static str> {
        self.body = self.body.trim().to_string();

        if self.body.is_empty() {
            return Err("No comment body provided");
        }

        if self.body.len() > 5000 {
            return Err("Comment body too long (max 5000 characters)");
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_body_is_trimmed() {
        let mut comment = CommentSubmission {
            body: "  Nice!  ".to_string(),
        };
        assert_eq!(comment.validate(), Ok(()));
        assert_eq!(comment.body, "Nice!");
    }

    #[test]
    fn test_blank_body_is_rejected() {
        let mut comment = CommentSubmission {
            body: " \n\t ".to_string(),
        };
        assert_eq!(comment.validate(), Err("No comment body provided"));
    }

    #[test]
    fn test_overlong_body_is_rejected() {
        let mut comment = CommentSubmission {
            body: "x".repeat(5001),
        };
        assert_eq!(
            comment.validate(),
            Err("Comment body too long (max 5000 characters)")
        );
    }
}
