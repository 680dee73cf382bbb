use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::Deserialize;

use crate::db::{self, NewUser};
use crate::error::{AppError, AuthError};
use crate::state::AppState;
use crate::web::pages;

use super::flash::{self, Flash};
use super::password::{hash_password, verify_password};
use super::session::{self, safe_next};

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn login_page(jar: SignedCookieJar, Query(query): Query<NextQuery>) -> impl IntoResponse {
    let (jar, flashes) = flash::take(jar);
    (jar, Html(pages::login(&flashes, safe_next(query.next.as_deref()))))
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Query(query): Query<NextQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let user = db::find_user_by_email(&state.db, &form.email).await?;

    let verified = match &user {
        Some(user) => {
            let stored = user.password_hash.clone();
            let password = form.password;
            tokio::task::spawn_blocking(move || verify_password(&password, &stored))
                .await
                .map_err(|e| AppError::Password(e.to_string()))??
        }
        None => false,
    };

    let next = safe_next(query.next.as_deref());

    match user {
        Some(user) if verified => {
            tracing::info!("User {} logged in", user.id);
            let jar = session::create_session(jar, &user);
            let jar = flash::push(jar, Flash::success(format!("Welcome back, {}!", user.name)));
            let target = next.unwrap_or("/predict");
            Ok((jar, Redirect::to(target)).into_response())
        }
        _ => {
            tracing::info!("Failed login attempt for {}", form.email);
            let (jar, mut flashes) = flash::take(jar);
            flashes.push(Flash::danger(AuthError::InvalidCredentials.to_string()));
            Ok((jar, Html(pages::login(&flashes, next))).into_response())
        }
    }
}

pub async fn register_page(jar: SignedCookieJar) -> impl IntoResponse {
    let (jar, flashes) = flash::take(jar);
    (jar, Html(pages::register(&flashes)))
}

pub async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if form.name.is_empty() || form.email.is_empty() || form.password.is_empty() {
        let (jar, mut flashes) = flash::take(jar);
        flashes.push(Flash::danger(AuthError::MissingFields.to_string()));
        return Ok((jar, Html(pages::register(&flashes))).into_response());
    }

    if db::find_user_by_email(&state.db, &form.email).await?.is_some() {
        return Ok(duplicate_email(jar));
    }

    let password = form.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Password(e.to_string()))??;

    let new_user = NewUser {
        name: form.name,
        email: form.email,
        password_hash,
    };

    match db::create_user(&state.db, &new_user).await {
        Ok(user) => {
            tracing::info!("Registered user {}", user.id);
            let jar = flash::push(jar, Flash::success("Registration successful. Please log in."));
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(e) if db::is_duplicate_email(&e) => Ok(duplicate_email(jar)),
        Err(e) => Err(e.into()),
    }
}

pub async fn logout(jar: SignedCookieJar) -> impl IntoResponse {
    let jar = session::destroy_session(jar);
    let jar = flash::push(jar, Flash::info("You have been logged out."));
    (jar, Redirect::to("/"))
}

fn duplicate_email(jar: SignedCookieJar) -> Response {
    let jar = flash::push(jar, Flash::warning(AuthError::DuplicateEmail.to_string()));
    (jar, Redirect::to("/login")).into_response()
}
