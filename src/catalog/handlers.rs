// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::{web, HttpRequest, HttpResponse, Result};
use minijinja::context;
use serde::Deserialize;

use super::forms::{validate_add_card, AddCardInput};
use super::models::NewCard;
use super::query::{CatalogQuery, Page, QueryError};
use super::{store, tags};
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::db::Database;
use crate::errors::{serve_400, serve_404, serve_500};
use crate::templates::PageChrome;
use crate::users::csrf;
use crate::users::forms::FieldError;
use crate::users::handlers::redirect_to_login;
use crate::users::middleware::AuthRequest;

#[derive(Debug, Deserialize)]
pub struct ListingParams {
    pub sort: Option<String>,
    pub order: Option<String>,
    pub search_query: Option<String>,
    pub page: Option<String>,
}

impl ListingParams {
    fn parse(&self, page_size: u32) -> Result<(CatalogQuery, Page), QueryError> {
        let query = CatalogQuery::from_params(
            self.sort.as_deref(),
            self.order.as_deref(),
            self.search_query.as_deref(),
        )?;
        let page = Page::parse(self.page.as_deref(), page_size)?;
        Ok((query, page))
    }
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

pub async fn catalog_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    params: web::Query<ListingParams>,
) -> Result<HttpResponse> {
    let (query, page) = match params.parse(config.catalog.page_size) {
        Ok(parsed) => parsed,
        Err(QueryError::InvalidParameter(message)) => {
            return serve_400(
                &state.error_renderer,
                Some(state.templates.as_ref()),
                &message,
            );
        }
    };

    let listing = match store::list_cards(&db, &query, page) {
        Ok(listing) => listing,
        Err(err) => {
            log::error!("Failed to list catalog cards: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    // Headline figure for the whole catalog, independent of any filter.
    // Served from the memoized count; staleness is bounded by its TTL.
    let total_cards = match state.count_cache.get_or_compute(|| store::count_cards(&db)) {
        Ok(total) => total,
        Err(err) => {
            log::error!("Failed to count catalog cards: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "catalog/catalog.html",
        context! {
            listing => listing,
            total_cards => total_cards,
            tag => (),
            sort => params.sort.as_deref().unwrap_or(""),
            order => params.order.as_deref().unwrap_or(""),
            search_query => params.search_query.as_deref().unwrap_or(""),
            ..chrome.to_value()
        },
    )
}

pub async fn card_detail(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let card_id = path.into_inner();

    let card = match store::get_card(&db, card_id) {
        Ok(card) => card,
        Err(err) if matches!(err, crate::db::StoreError::NotFound) => {
            return serve_404(&state.error_renderer, Some(state.templates.as_ref()));
        }
        Err(err) => {
            log::error!("Failed to load card {}: {}", card_id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let card_tags = match store::tags_for_card(&db, card_id) {
        Ok(card_tags) => card_tags,
        Err(err) => {
            log::error!("Failed to load tags for card {}: {}", card_id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    // The page shows the count as it was before this visit; the increment
    // lands in the database regardless of how the render goes.
    if let Err(err) = store::increment_views(&db, card_id) {
        log::error!("Failed to record view for card {}: {}", card_id, err);
    }

    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "catalog/card_detail.html",
        context! {
            card => card,
            tags => card_tags,
            ..chrome.to_value()
        },
    )
}

pub async fn tag_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    path: web::Path<i64>,
    params: web::Query<ListingParams>,
) -> Result<HttpResponse> {
    let tag_id = path.into_inner();

    let tag = match store::get_tag(&db, tag_id) {
        Ok(tag) => tag,
        Err(err) if matches!(err, crate::db::StoreError::NotFound) => {
            return serve_404(&state.error_renderer, Some(state.templates.as_ref()));
        }
        Err(err) => {
            log::error!("Failed to load tag {}: {}", tag_id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let (query, page) = match params.parse(config.catalog.page_size) {
        Ok(parsed) => parsed,
        Err(QueryError::InvalidParameter(message)) => {
            return serve_400(
                &state.error_renderer,
                Some(state.templates.as_ref()),
                &message,
            );
        }
    };
    let query = query.with_tag(tag.id);

    let listing = match store::list_cards(&db, &query, page) {
        Ok(listing) => listing,
        Err(err) => {
            log::error!("Failed to list cards for tag {}: {}", tag_id, err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let total_cards = match state.count_cache.get_or_compute(|| store::count_cards(&db)) {
        Ok(total) => total,
        Err(err) => {
            log::error!("Failed to count catalog cards: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let chrome = PageChrome::new(&config.app.name, req.current_user())
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "catalog/catalog.html",
        context! {
            listing => listing,
            total_cards => total_cards,
            tag => tag,
            sort => params.sort.as_deref().unwrap_or(""),
            order => params.order.as_deref().unwrap_or(""),
            search_query => params.search_query.as_deref().unwrap_or(""),
            ..chrome.to_value()
        },
    )
}

pub async fn add_card_page(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
) -> Result<HttpResponse> {
    let Some(user) = req.current_user() else {
        return Ok(redirect_to_login(req.path()));
    };

    let categories = match store::list_categories(&db) {
        Ok(categories) => categories,
        Err(err) => {
            log::error!("Failed to load categories: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let chrome = PageChrome::new(&config.app.name, Some(user))
        .with_csrf(csrf::page_token(&req, &state, &config));
    render_or_500(
        &state,
        "catalog/add_card.html",
        context! {
            categories => categories,
            errors => Vec::<FieldError>::new(),
            question => "",
            answer => "",
            selected_category => "",
            tags => "",
            ..chrome.to_value()
        },
    )
}

pub async fn add_card_submit(
    req: HttpRequest,
    state: web::Data<AppState>,
    db: web::Data<Database>,
    config: web::Data<ValidatedConfig>,
    form: web::Form<AddCardInput>,
) -> Result<HttpResponse> {
    let Some(user) = req.current_user() else {
        return Ok(redirect_to_login(req.path()));
    };
    csrf::require_token(&req, &state, &config, &form.csrf_token)?;

    let categories = match store::list_categories(&db) {
        Ok(categories) => categories,
        Err(err) => {
            log::error!("Failed to load categories: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let valid = match validate_add_card(&form, &categories) {
        Ok(valid) => valid,
        Err(errors) => {
            let chrome = PageChrome::new(&config.app.name, Some(user))
                .with_csrf(csrf::page_token(&req, &state, &config));
            return render_or_500(
                &state,
                "catalog/add_card.html",
                context! {
                    categories => categories,
                    errors => errors,
                    question => form.question.as_str(),
                    answer => form.answer.as_str(),
                    selected_category => form.category.as_str(),
                    tags => form.tags.as_str(),
                    ..chrome.to_value()
                },
            );
        }
    };

    // The card row is saved first; tag attachment needs its id.
    let new_card = NewCard {
        question: valid.question,
        answer: valid.answer,
        category_id: valid.category_id,
        author_id: Some(user.id),
    };
    let card_id = match store::insert_card(&db, &new_card) {
        Ok(card_id) => card_id,
        Err(err) => {
            log::error!("Failed to save card: {}", err);
            return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
        }
    };

    let tag_names = tags::parse_tag_names(&form.tags);
    if let Err(err) = store::attach_tags(&db, card_id, &tag_names) {
        log::error!("Failed to attach tags to card {}: {}", card_id, err);
        return serve_500(&state.error_renderer, Some(state.templates.as_ref()));
    }

    log::info!("User '{}' added card {}", user.username, card_id);
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/cards/{}/detail/", card_id)))
        .finish())
}
