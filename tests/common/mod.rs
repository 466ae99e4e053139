// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

#![allow(dead_code)]

use actix_web::cookie::Cookie;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};
use flashdeck::app_state::AppState;
use flashdeck::catalog::models::{Category, NewCard};
use flashdeck::catalog::store as card_store;
use flashdeck::config::{validate_config, RawConfig, ValidatedConfig};
use flashdeck::db::Database;
use flashdeck::users::middleware::SessionAuthMiddlewareFactory;
use flashdeck::users::models::{NewUser, User};
use flashdeck::users::password::hash_password;
use flashdeck::users::store as user_store;
use flashdeck::{admin, catalog, pages, users};
use std::sync::Arc;

pub const TEST_PASSWORD: &str = "correct horse battery";

pub struct TestHarness {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub db: Arc<Database>,
}

#[derive(Clone)]
pub struct AppBundle {
    pub config: Arc<ValidatedConfig>,
    pub app_state: Arc<AppState>,
    pub db: Arc<Database>,
}

impl TestHarness {
    pub fn new() -> Self {
        let config = Arc::new(build_config());
        let app_state = Arc::new(AppState::new(&config));
        let db = Arc::new(Database::open_in_memory().expect("in-memory database"));
        Self {
            config,
            app_state,
            db,
        }
    }

    pub fn app_bundle(&self) -> AppBundle {
        AppBundle {
            config: self.config.clone(),
            app_state: self.app_state.clone(),
            db: self.db.clone(),
        }
    }

    pub fn seed_category(&self, name: &str) -> Category {
        card_store::create_category(&self.db, name).expect("seed category")
    }

    pub fn seed_card(&self, question: &str, answer: &str, category_id: i64) -> i64 {
        card_store::insert_card(
            &self.db,
            &NewCard {
                question: question.to_string(),
                answer: answer.to_string(),
                category_id,
                author_id: None,
            },
        )
        .expect("seed card")
    }

    pub fn seed_card_by(
        &self,
        question: &str,
        answer: &str,
        category_id: i64,
        author_id: i64,
    ) -> i64 {
        card_store::insert_card(
            &self.db,
            &NewCard {
                question: question.to_string(),
                answer: answer.to_string(),
                category_id,
                author_id: Some(author_id),
            },
        )
        .expect("seed card")
    }

    pub fn seed_user(&self, username: &str, is_operator: bool) -> User {
        let password_hash = hash_password(TEST_PASSWORD, &self.config.password).expect("hash");
        let user_id = user_store::insert_user(
            &self.db,
            &NewUser {
                username: username.to_string(),
                email: format!("{}@example.com", username),
                password_hash,
            },
        )
        .expect("seed user");
        if is_operator {
            user_store::set_operator(&self.db, user_id, true).expect("promote");
        }
        user_store::get_by_id(&self.db, user_id).expect("reload user")
    }

    /// Issues a live session for the user and wraps it in the auth cookie.
    pub fn login_cookie(&self, user: &User) -> Cookie<'static> {
        let session_id = self.app_state.sessions.issue(user.id);
        Cookie::new(self.config.sessions.cookie_name.clone(), session_id)
    }

    /// Mints the form token for an issued session cookie, as a rendered
    /// page would.
    pub fn csrf_token(&self, cookie: &Cookie<'_>) -> String {
        self.app_state.csrf.token_for(cookie.value())
    }
}

fn build_config() -> ValidatedConfig {
    let mut raw = RawConfig::default();
    // Cheap hashing keeps the suite fast; production costs come from config.
    raw.password.memory_kib = 1024;
    raw.password.iterations = 1;
    validate_config(raw).expect("test config")
}

pub fn build_test_app(
    bundle: AppBundle,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::from(bundle.config))
        .app_data(web::Data::from(bundle.app_state))
        .app_data(web::Data::from(bundle.db))
        .wrap(SessionAuthMiddlewareFactory)
        .configure(pages::configure)
        .configure(catalog::configure)
        .configure(users::configure)
        .configure(admin::configure)
        .default_service(web::route().to(pages::not_found))
}
