// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::web;

pub mod csrf;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod sessions;
pub mod store;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/users")
            .route("/login/", web::get().to(handlers::login_page))
            .route("/login/", web::post().to(handlers::login_submit))
            .route("/logout/", web::post().to(handlers::logout))
            .route("/signup/", web::get().to(handlers::signup_page))
            .route("/signup/", web::post().to(handlers::signup_submit))
            .route("/thanks/", web::get().to(handlers::thanks_page))
            .route("/profile/", web::get().to(handlers::profile_page))
            .route("/profile/", web::post().to(handlers::profile_submit))
            .route("/profile/cards/", web::get().to(handlers::profile_cards)),
    );
}
