// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::catalog::query::{CatalogQuery, Page, QueryError};
use crate::catalog::store;
use crate::config::ValidatedConfig;
use crate::db::{Database, StoreError};
use crate::errors::{serve_400, serve_404, serve_500};
use crate::templates::PageChrome;
use crate::users::csrf::{self, CsrfForm};
use crate::users::handlers::redirect_to_login;
use crate::users::middleware::AuthRequest;

#[derive(Debug, Deserialize)]
pub struct PageParam {
    pub page: Option<String>,
}

/// Review queue for operators: every card, newest first, with its checked
/// flag. Non-operators get the same 404 as any other missing page.
pub async fn cards_index(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    params: web::Query<PageParam>,
) -> Result<HttpResponse> {
    let Some(user) = req.current_user() else {
        return Ok(redirect_to_login(req.path()));
    };
    if !user.is_operator {
        return serve_404(&state.error_renderer, Some(state.templates.as_ref()));
    }

    let page = match Page::parse(params.page.as_deref(), config.catalog.operator_page_size) {
        Ok(page) => page,
        Err(QueryError::InvalidParameter(message)) => {
            return serve_400(
                &state.error_renderer,
                Some(state.templates.as_ref()),
                &message,
            );
        }
    };

    let listing = match store::list_cards(&db, &CatalogQuery::default(), page) {
        Ok(listing) => listing,
        Err(err) => {
            log::error!("Failed to list cards for review: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let chrome = PageChrome::new(&config.app.name, Some(user))
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "admin/cards_index.html",
        context! {
            listing => listing,
            ..chrome.to_value()
        },
    )
}

pub async fn toggle_check(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    path: web::Path<i64>,
    params: web::Query<PageParam>,
    form: web::Form<CsrfForm>,
) -> Result<HttpResponse> {
    let Some(user) = req.current_user() else {
        return Ok(redirect_to_login(req.path()));
    };
    if !user.is_operator {
        return serve_404(&state.error_renderer, Some(state.templates.as_ref()));
    }
    csrf::require_token(&req, &state, &config, &form.csrf_token)?;

    let card_id = path.into_inner();
    match store::toggle_check_status(&db, card_id) {
        Ok(checked) => {
            log::info!(
                "Operator '{}' marked card {} as {}",
                user.username,
                card_id,
                if checked { "checked" } else { "unchecked" }
            );
        }
        Err(StoreError::NotFound) => {
            return serve_404(&state.error_renderer, Some(state.templates.as_ref()));
        }
        Err(err) => {
            log::error!("Failed to toggle check status for card {}: {}", card_id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    }

    // Only a plain page number goes back into the Location header.
    let location = match params.page.as_deref() {
        Some(page) if page.parse::<u32>().is_ok() => format!("/admin/cards/?page={}", page),
        _ => "/admin/cards/".to_string(),
    };
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish())
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
