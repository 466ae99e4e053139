// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::web::Data;
use actix_web::Error;
use actix_web::{HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use std::pin::Pin;
use std::rc::Rc;

use super::models::User;
use super::store;
use crate::app_state::AppState;
use crate::config::ValidatedConfig;
use crate::db::{Database, StoreError};

/// Trait to add authentication methods to HttpRequest
pub trait AuthRequest {
    fn current_user(&self) -> Option<User>;
    fn is_authenticated(&self) -> bool;
    fn is_operator(&self) -> bool;
}

impl AuthRequest for HttpRequest {
    fn current_user(&self) -> Option<User> {
        self.extensions().get::<User>().cloned()
    }

    fn is_authenticated(&self) -> bool {
        self.extensions().get::<User>().is_some()
    }

    fn is_operator(&self) -> bool {
        self.extensions()
            .get::<User>()
            .map(|user| user.is_operator)
            .unwrap_or(false)
    }
}

// Session cookie authentication middleware
pub struct SessionAuthMiddlewareFactory;

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct SessionAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let state = req.app_data::<Data<AppState>>().cloned();
        let db = req.app_data::<Data<Database>>().cloned();
        let config = req.app_data::<Data<ValidatedConfig>>().cloned();
        let service = self.service.clone();

        Box::pin(async move {
            if let (Some(state), Some(db), Some(config)) = (state, db, config) {
                let cookie_name = &config.sessions.cookie_name;
                if let Some(cookie) = req.cookie(cookie_name) {
                    if let Some(user_id) = state.sessions.resolve(cookie.value()) {
                        match store::get_by_id(&db, user_id) {
                            Ok(user) => {
                                req.extensions_mut().insert(user);
                            }
                            // Account deleted since the session was issued;
                            // the stale session is dead weight.
                            Err(StoreError::NotFound) => {
                                state.sessions.invalidate(cookie.value());
                            }
                            Err(err) => {
                                log::error!(
                                    "Failed to load user {} for session: {}",
                                    user_id,
                                    err
                                );
                            }
                        }
                    }
                }
            }

            service.call(req).await
        })
    }
}
