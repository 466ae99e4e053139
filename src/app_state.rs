// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::count_cache::CardCountCache;
use crate::config::ValidatedConfig;
use crate::errors::ErrorRenderer;
use crate::templates::{MiniJinjaEngine, TemplateEngine};
use crate::users::csrf::CsrfTokenStore;
use crate::users::sessions::SessionStore;

pub struct AppState {
    pub templates: Arc<dyn TemplateEngine>,
    pub error_renderer: ErrorRenderer,
    pub count_cache: CardCountCache,
    pub sessions: SessionStore,
    pub csrf: CsrfTokenStore,
}

impl AppState {
    pub fn new(config: &ValidatedConfig) -> Self {
        Self {
            templates: Arc::new(MiniJinjaEngine::new()),
            error_renderer: ErrorRenderer::new(config.app.name.clone()),
            count_cache: CardCountCache::new(Duration::from_secs(
                config.catalog.count_cache_ttl_seconds,
            )),
            sessions: SessionStore::new(Duration::from_secs(
                config.sessions.ttl_hours * 3600,
            )),
            csrf: CsrfTokenStore::new(),
        }
    }
}
