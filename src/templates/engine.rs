// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use minijinja::{default_auto_escape_callback, Environment, Value};

pub trait TemplateEngine: Send + Sync {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error>;
}

pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(default_auto_escape_callback);
        env.set_loader(embedded_template_loader);
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, template_name: &str, context: Value) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template_name)?;
        tmpl.render(context)
    }
}

/// Template loader for minijinja that loads from embedded sources
fn embedded_template_loader(name: &str) -> Result<Option<String>, minijinja::Error> {
    let template_content = match name {
        // Shared layout
        "base.html" => Some(include_str!("base.html")),

        // Error pages
        "error_400.html" => Some(include_str!("../pages/templates/error_400.html")),
        "error_404.html" => Some(include_str!("../pages/templates/error_404.html")),
        "error_500.html" => Some(include_str!("../pages/templates/error_500.html")),

        // Static pages
        "pages/index.html" => Some(include_str!("../pages/templates/index.html")),
        "pages/about.html" => Some(include_str!("../pages/templates/about.html")),

        // Catalog templates
        "catalog/catalog.html" => Some(include_str!("../catalog/templates/catalog.html")),
        "catalog/card_detail.html" => Some(include_str!("../catalog/templates/card_detail.html")),
        "catalog/add_card.html" => Some(include_str!("../catalog/templates/add_card.html")),

        // Account templates
        "users/login.html" => Some(include_str!("../users/templates/login.html")),
        "users/signup.html" => Some(include_str!("../users/templates/signup.html")),
        "users/thanks.html" => Some(include_str!("../users/templates/thanks.html")),
        "users/profile.html" => Some(include_str!("../users/templates/profile.html")),
        "users/profile_cards.html" => {
            Some(include_str!("../users/templates/profile_cards.html"))
        }

        // Operator templates
        "admin/cards_index.html" => Some(include_str!("../admin/templates/cards_index.html")),

        _ => None,
    };

    Ok(template_content.map(|s| s.to_string()))
}
