// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;

use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::errors::{serve_404, serve_500};
use crate::templates::PageChrome;
use crate::users::csrf;
use crate::users::middleware::AuthRequest;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/about/", web::get().to(about));
}

async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
) -> Result<HttpResponse> {
    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "pages/index.html",
        context! {
            description => &config.app.description,
            ..chrome.to_value()
        },
    )
}

async fn about(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<ValidatedConfig>,
) -> Result<HttpResponse> {
    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "pages/about.html",
        context! {
            description => &config.app.description,
            ..chrome.to_value()
        },
    )
}

/// Default service for unmatched routes.
pub async fn not_found(state: web::Data<AppState>) -> Result<HttpResponse> {
    serve_404(&state.error_renderer, Some(state.templates.as_ref()))
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
