use axum::http::request::Parts;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{
    App,
    error::{ApiRequestError, AppError},
    schema::{identities, sessions},
};

use self::models::identity::Identity;

pub mod models;
pub mod routes;

pub const COOKIE_NAME: &str = "auth_token";

#[derive(thiserror::Error, Debug)]
pub enum AuthenticationError {
    #[error("Authentication required, but no cookie `{COOKIE_NAME}` found in headers.")]
    NoCookie,

    #[error(
        "Unauthorized, please check if you're logged in by refreshing the \
         page. This could be due to an expired session or token has became invalid."
    )]
    Unauthorized,
}

impl From<AuthenticationError> for AppError {
    fn from(e: AuthenticationError) -> Self {
        AppError::Message(e.to_string(), e.status_code())
    }
}

/// The actor behind the request, if any. Read endpoints that stay open to
/// anonymous callers use this and decide what to do with the `Err` side.
pub struct MaybeAuthUser(pub Result<Identity, AuthenticationError>);

impl axum::extract::FromRequestParts<App> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let jar = axum_extra::extract::cookie::CookieJar::from_headers(&parts.headers);

        let session_token: &str = if let Some(t) = jar.get(COOKIE_NAME) {
            t.value()
        } else {
            return Ok(MaybeAuthUser(Err(AuthenticationError::NoCookie)));
        };

        let mut conn = state.diesel.get().await?;

        let identity = sessions::table
            .inner_join(identities::table)
            .filter(sessions::token.eq(session_token))
            .filter(sessions::active.eq(true))
            .filter(sessions::expires_at.gt(diesel::dsl::now))
            .filter(sessions::issued_at.le(diesel::dsl::now))
            .select(Identity::as_select())
            .first::<Identity>(&mut conn)
            .await
            .optional()?;

        Ok(MaybeAuthUser(
            identity.ok_or(AuthenticationError::Unauthorized),
        ))
    }
}

/// The authenticated actor. Rejects the request with 401 when the session
/// cookie is missing, expired or revoked.
pub struct AuthUser(pub Identity);

impl axum::extract::FromRequestParts<App> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &App) -> Result<Self, Self::Rejection> {
        let MaybeAuthUser(auth_user) = MaybeAuthUser::from_request_parts(parts, state).await?;

        Ok(AuthUser(auth_user?))
    }
}
