use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Text};
use diesel_async::RunQueryDsl;

use crate::{
    App,
    error::{ApiRequestError, AppError},
    identity::models::{
        identity::{Identity, Traits},
        session::Session,
    },
    schema::{identities, sessions},
};

use super::{AuthenticationError, COOKIE_NAME, MaybeAuthUser};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/me", get(handle_whoami))
        .route("/is_auth", get(is_auth))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

impl ApiRequestError for AuthenticationError {
    fn status_code(&self) -> axum::http::StatusCode {
        match self {
            AuthenticationError::NoCookie => axum::http::StatusCode::BAD_REQUEST,
            AuthenticationError::Unauthorized => axum::http::StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(serde::Serialize)]
pub struct WhoamiResponse {
    traits: Traits,
}

#[derive(serde::Serialize)]
struct IsAuth {
    is_auth: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    traits: Option<Traits>,
}

async fn is_auth(MaybeAuthUser(identity): MaybeAuthUser) -> Result<Json<IsAuth>, AppError> {
    Ok(Json(IsAuth {
        is_auth: identity.is_ok(),
        id: identity.as_ref().ok().map(|i| i.id),
        traits: identity
            .as_ref()
            .ok()
            .map(|i| Traits::from(i.traits.clone())),
    }))
}

async fn handle_whoami(
    MaybeAuthUser(identity): MaybeAuthUser,
) -> Result<Json<WhoamiResponse>, AppError> {
    Ok(Json(WhoamiResponse {
        traits: Traits::from(identity?.traits),
    }))
}

#[derive(serde::Deserialize)]
struct LoginSubmission {
    email: String,
    name: Option<String>,
}

impl LoginSubmission {
    fn validate(&mut self) -> Result<(), &'static str> {
        self.email = self.email.trim().to_lowercase();

        if self.email.is_empty() {
            return Err("No email provided");
        }

        if self.email.len() > 50 {
            return Err("Email too long");
        }

        if !self.email.contains('@') {
            return Err("Invalid email");
        }

        if let Some(mut name) = self.name.take() {
            name = name.trim().to_string();
            if name.is_empty() {
                return Err("No name provided");
            }

            if name.len() > 50 {
                return Err("Name too long");
            }

            self.name = Some(name);
        }

        Ok(())
    }
}

/// Resolves (or provisions) the identity for the submitted email and issues a
/// session for it. Credential verification is the identity provider's job and
/// does not happen here; deployments front this endpoint with it.
async fn login(
    State(ctx): State<App>,
    jar: CookieJar,
    crate::json::Json(mut submission): crate::json::Json<LoginSubmission>,
) -> Result<(CookieJar, Json<WhoamiResponse>), AppError> {
    submission
        .validate()
        .map_err(|e| (e, StatusCode::BAD_REQUEST))?;

    let mut conn = ctx.diesel.get().await?;

    let existing = identities::table
        .filter(sql::<Bool>("traits->>'email' = ").bind::<Text, _>(submission.email.clone()))
        .select(Identity::as_select())
        .first::<Identity>(&mut conn)
        .await
        .optional()?;

    let identity = match existing {
        Some(identity) => identity,
        None => {
            let new_identity = Identity::new_with_traits(Traits {
                email: Some(submission.email),
                name: submission.name,
            });
            diesel::insert_into(identities::table)
                .values(&new_identity)
                .returning(Identity::as_returning())
                .get_result(&mut conn)
                .await?
        }
    };

    let new_session = Session::new_with_identity_id(identity.id);
    diesel::insert_into(sessions::table)
        .values(&new_session)
        .execute(&mut conn)
        .await?;

    let cookie = Cookie::build((COOKIE_NAME, new_session.token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::days(365))
        .build();

    Ok((
        jar.add(cookie),
        Json(WhoamiResponse {
            traits: Traits::from(identity.traits),
        }),
    ))
}

async fn logout(
    State(ctx): State<App>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    if let Some(cookie) = jar.get(COOKIE_NAME) {
        let mut conn = ctx.diesel.get().await?;
        diesel::update(sessions::table.filter(sessions::token.eq(cookie.value())))
            .set((
                sessions::active.eq(false),
                sessions::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await?;
    }

    let jar = jar.remove(Cookie::build((COOKIE_NAME, "")).path("/").build());
    Ok((jar, StatusCode::NO_CONTENT))
}
