// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

pub mod count_cache;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod query;
pub mod store;
pub mod tags;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cards")
            .route("/catalog/", web::get().to(handlers::catalog_page))
            .route("/add_card/", web::get().to(handlers::add_card_page))
            .route("/add_card/", web::post().to(handlers::add_card_submit))
            .route("/tags/{tag_id}/", web::get().to(handlers::tag_page))
            .route("/{card_id}/detail/", web::get().to(handlers::card_detail)),
    );
}
