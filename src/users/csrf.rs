// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use actix_web::error::{ErrorBadRequest, ErrorForbidden};
use actix_web::HttpRequest;
use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::RwLock;

use super::middleware::AuthRequest;
use crate::app_state::AppState;
use crate::config::ValidatedConfig;

const MAX_TOKENS: usize = 10000;

/// Per-session tokens that state-changing forms must echo back in a hidden
/// `csrf_token` field. A token is minted the first time a signed-in page
/// renders and stays stable for the session, so forms in other open tabs
/// keep working.
pub struct CsrfTokenStore {
    inner: RwLock<HashMap<String, String>>,
}

impl CsrfTokenStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the session's token, minting one on first use.
    pub fn token_for(&self, session_id: &str) -> String {
        let mut tokens = self.write();
        if let Some(token) = tokens.get(session_id) {
            return token.clone();
        }
        // Entries for sessions that expired without a logout linger; past
        // the cap they are all dropped and live sessions re-mint on the
        // next page view.
        if tokens.len() >= MAX_TOKENS {
            tokens.clear();
        }
        let token = generate_token();
        tokens.insert(session_id.to_string(), token.clone());
        token
    }

    /// True only if a token was minted for this session and matches.
    pub fn validate(&self, session_id: &str, token: &str) -> bool {
        let tokens = self.read();
        tokens
            .get(session_id)
            .map(|stored| stored == token)
            .unwrap_or(false)
    }

    pub fn invalidate(&self, session_id: &str) {
        let mut tokens = self.write();
        tokens.remove(session_id);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, String>> {
        match self.inner.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("CSRF token store lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, String>> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("CSRF token store lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl Default for CsrfTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The lone hidden field, for forms whose handler takes no other input.
#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

/// The token to embed in a page's forms. `None` for anonymous requests;
/// their pages carry no state-changing forms.
pub fn page_token(
    req: &HttpRequest,
    state: &AppState,
    config: &ValidatedConfig,
) -> Option<String> {
    if !req.is_authenticated() {
        return None;
    }
    let cookie = req.cookie(&config.sessions.cookie_name)?;
    Some(state.csrf.token_for(cookie.value()))
}

/// Rejects the request unless the posted token matches the one minted for
/// the request's session. Handlers call this after their signed-in gate.
pub fn require_token(
    req: &HttpRequest,
    state: &AppState,
    config: &ValidatedConfig,
    token: &str,
) -> Result<(), actix_web::Error> {
    if token.is_empty() {
        return Err(ErrorBadRequest("CSRF token required"));
    }
    let valid = match req.cookie(&config.sessions.cookie_name) {
        Some(cookie) => state.csrf.validate(cookie.value(), token),
        None => false,
    };
    if !valid {
        return Err(ErrorForbidden("CSRF token validation failed"));
    }
    Ok(())
}

fn generate_token() -> String {
    let mut bytes = [0u8; 18];
    OsRng.fill_bytes(&mut bytes);
    format!("fct_{}", URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_stable_per_session() {
        let store = CsrfTokenStore::new();
        let first = store.token_for("fds_session");
        let second = store.token_for("fds_session");
        assert!(first.starts_with("fct_"));
        assert_eq!(first, second);
    }

    #[test]
    fn sessions_get_distinct_tokens() {
        let store = CsrfTokenStore::new();
        assert_ne!(store.token_for("fds_one"), store.token_for("fds_two"));
    }

    #[test]
    fn validate_requires_the_minted_token() {
        let store = CsrfTokenStore::new();
        let token = store.token_for("fds_session");
        assert!(store.validate("fds_session", &token));
        assert!(!store.validate("fds_session", "fct_forged"));
        assert!(!store.validate("fds_other", &token));
    }

    #[test]
    fn unminted_sessions_never_validate() {
        let store = CsrfTokenStore::new();
        assert!(!store.validate("fds_session", ""));
        assert!(!store.validate("fds_session", "fct_anything"));
    }

    #[test]
    fn invalidate_drops_the_token() {
        let store = CsrfTokenStore::new();
        let token = store.token_for("fds_session");
        store.invalidate("fds_session");
        assert!(!store.validate("fds_session", &token));
        // A fresh mint replaces it.
        assert_ne!(store.token_for("fds_session"), token);
    }
}
