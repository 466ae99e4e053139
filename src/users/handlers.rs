// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde::Deserialize;

use super::csrf::{self, CsrfForm};
use super::forms::{
    validate_profile, validate_signup, FieldError, LoginInput, ProfileInput, SignupInput,
};
use super::middleware::AuthRequest;
use super::models::{NewUser, ProfileUpdate};
use super::{password, store};
use crate::app_state::AppState;
use crate::catalog;
use crate::catalog::query::{CatalogQuery, Page, QueryError};
use crate::config::ValidatedConfig;
use crate::db::Database;
use crate::errors::{serve_400, serve_500};
use crate::templates::PageChrome;

#[derive(Debug, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

/// Builds the login redirect for a page that needs a signed-in user. The
/// original path comes back as `?next=` so login can return the visitor.
pub fn redirect_to_login(path: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((
            "Location",
            format!("/users/login/?next={}", encode_query_component(path)),
        ))
        .finish()
}

/// Only same-site relative targets are followed after login; anything else
/// falls back to the home page to keep this from becoming an open redirect.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

fn encode_query_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

fn render_or_500(
    state: &AppState,
    template_name: &str,
    context: minijinja::Value,
) -> Result<HttpResponse> {
    match state.templates.render(template_name, context) {
        Ok(html) => Ok(HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html)),
        Err(err) => {
            log::error!("Failed to render {}: {}", template_name, err);
            serve_500(&state.error_renderer, Some(state.templates.as_ref()))
        }
    }
}

pub async fn login_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
    query: web::Query<NextParam>,
) -> Result<HttpResponse> {
    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "users/login.html",
        context! {
            next => query.next.as_deref().unwrap_or(""),
            login_error => false,
            ..chrome.to_value()
        },
    )
}

pub async fn login_submit(
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    query: web::Query<NextParam>,
    form: web::Form<LoginInput>,
) -> Result<HttpResponse> {
    let credentials = match store::find_credentials(&db, form.username.trim()) {
        Ok(credentials) => credentials,
        Err(err) => {
            log::error!("Credential lookup failed: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let authenticated = match &credentials {
        Some((_, stored_hash)) => {
            password::verify_password(&form.password, stored_hash).unwrap_or_else(|err| {
                log::error!("Stored password hash is unreadable: {}", err);
                false
            })
        }
        None => false,
    };

    let (user, _) = match (authenticated, credentials) {
        (true, Some(pair)) => pair,
        _ => {
            log::info!("Failed login attempt for '{}'", form.username.trim());
            let chrome = PageChrome::new(&config.app.name, None);
            return render_or_500(
                &state,
                "users/login.html",
                context! {
                    next => query.next.as_deref().unwrap_or(""),
                    login_error => true,
                    ..chrome.to_value()
                },
            );
        }
    };
    let session_id = state.sessions.issue(user.id);
    log::info!("User '{}' signed in", user.username);

    let cookie = Cookie::build(config.sessions.cookie_name.clone(), session_id)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", safe_next(query.next.as_deref())))
        .cookie(cookie)
        .finish())
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
    form: web::Form<CsrfForm>,
) -> Result<HttpResponse> {
    if let Some(cookie) = req.cookie(&config.sessions.cookie_name) {
        if req.is_authenticated() {
            csrf::require_token(&req, &state, &config, &form.csrf_token)?;
        }
        state.csrf.invalidate(cookie.value());
        state.sessions.invalidate(cookie.value());
    }

    let mut expired = Cookie::build(config.sessions.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    expired.set_max_age(time::Duration::ZERO);

    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/"))
        .cookie(expired)
        .finish())
}

pub async fn signup_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
) -> Result<HttpResponse> {
    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "users/signup.html",
        context! {
            errors => Vec::<FieldError>::new(),
            username => "",
            email => "",
            ..chrome.to_value()
        },
    )
}

pub async fn signup_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    form: web::Form<SignupInput>,
) -> Result<HttpResponse> {
    let mut errors = validate_signup(&form);

    if errors.is_empty() {
        let password_hash = match password::hash_password(&form.password1, &config.password) {
            Ok(hash) => hash,
            Err(err) => {
                log::error!("Password hashing failed: {}", err);
                return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
            }
        };
        let new_user = NewUser {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password_hash,
        };
        match store::insert_user(&db, &new_user) {
            Ok(_) => {
                log::info!("New account '{}' registered", new_user.username);
                return Ok(HttpResponse::SeeOther()
                    .insert_header(("Location", "/users/thanks/"))
                    .finish());
            }
            Err(err) if err.is_constraint() => {
                errors.push(FieldError {
                    field: "username",
                    message: "That username or email is already taken".to_string(),
                });
            }
            Err(err) => {
                log::error!("Failed to create account: {}", err);
                return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
            }
        }
    }

    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "users/signup.html",
        context! {
            errors => errors,
            username => form.username.as_str(),
            email => form.email.as_str(),
            ..chrome.to_value()
        },
    )
}

pub async fn thanks_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
) -> Result<HttpResponse> {
    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(&state, "users/thanks.html", chrome.to_value())
}

pub async fn profile_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
) -> Result<HttpResponse> {
    let Some(user) = req.current_user() else {
        return Ok(redirect_to_login(req.path()));
    };
    let chrome = PageChrome::new(&config.app.name, Some(user))
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "users/profile.html",
        context! {
            errors => Vec::<FieldError>::new(),
            saved => false,
            ..chrome.to_value()
        },
    )
}

pub async fn profile_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    form: web::Form<ProfileInput>,
) -> Result<HttpResponse> {
    let Some(user) = req.current_user() else {
        return Ok(redirect_to_login(req.path()));
    };
    csrf::require_token(&req, &state, &config, &form.csrf_token)?;

    let errors = validate_profile(&form);
    if errors.is_empty() {
        let photo = form.photo.trim();
        let date_birth = form.date_birth.trim();
        let update = ProfileUpdate {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            photo: (!photo.is_empty()).then(|| photo.to_string()),
            date_birth: (!date_birth.is_empty()).then(|| date_birth.to_string()),
        };
        if let Err(err) = store::update_profile(&db, user.id, &update) {
            log::error!("Failed to update profile for user {}: {}", user.id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    }

    // Re-read so the page reflects what was stored, not what was posted.
    let user = match store::get_by_id(&db, user.id) {
        Ok(user) => user,
        Err(err) => {
            log::error!("Failed to reload user {}: {}", user.id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };
    let saved = errors.is_empty();
    let chrome = PageChrome::new(&config.app.name, Some(user))
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "users/profile.html",
        context! {
            errors => errors,
            saved => saved,
            ..chrome.to_value()
        },
    )
}

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub search_query: Option<String>,
    pub page: Option<String>,
}

/// The signed-in user's own cards, driven by the same query machinery as
/// the public catalog but pinned to their author id.
pub async fn profile_cards(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    params: web::Query<ListingParams>,
) -> Result<HttpResponse> {
    let Some(user) = req.current_user() else {
        return Ok(redirect_to_login(req.path()));
    };

    let parsed = CatalogQuery::from_params(
        params.sort.as_deref(),
        params.order.as_deref(),
        params.search_query.as_deref(),
    )
    .and_then(|query| {
        let page = Page::parse(params.page.as_deref(), config.catalog.page_size)?;
        Ok((query.with_author(user.id), page))
    });
    let (query, page) = match parsed {
        Ok(parsed) => parsed,
        Err(QueryError::InvalidParameter(message)) => {
            return serve_400(
                &state.error_renderer,
                Some(state.templates.as_ref()),
                &message,
            );
        }
    };

    let listing = match catalog::store::list_cards(&db, &query, page) {
        Ok(listing) => listing,
        Err(err) => {
            log::error!("Failed to list cards for user {}: {}", user.id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let chrome = PageChrome::new(&config.app.name, Some(user))
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "users/profile_cards.html",
        context! {
            listing => listing,
            sort => params.sort.as_deref().unwrap_or(""),
            order => params.order.as_deref().unwrap_or(""),
            search_query => params.search_query.as_deref().unwrap_or(""),
            ..chrome.to_value()
        },
    )
}
