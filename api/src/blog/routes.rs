use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::App;

use super::comment::{
    create::create_comment, delete::delete_comment, detail::get_comment, get::get_comments,
    reply::reply_to_comment, update::update_comment,
};
use super::post::{
    create::create_post, delete::delete_post, get::get_post, list::list_posts, update::update_post,
};

pub fn route() -> Router<App> {
    // TODO rate limit the write endpoints
    Router::<App>::new()
        .route("/", get(list_posts))
        .route("/", post(create_post))
        .route("/{id}", get(get_post))
        .route("/{id}", put(update_post))
        .route("/{id}", delete(delete_post))
        .route("/{id}/comments", get(get_comments))
        .route("/{id}/comments", post(create_comment))
        .route("/{id}/comments/{comment_id}", get(get_comment))
        .route("/{id}/comments/{comment_id}", put(update_comment))
        .route("/{id}/comments/{comment_id}", delete(delete_comment))
        .route("/{id}/comments/{comment_id}/reply", post(reply_to_comment))
}
