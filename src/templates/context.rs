// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::nav::{menu_items, MenuItem};
use crate::users::models::User;
use minijinja::{context, Value};

/// The context keys every server-rendered page shares: the application name,
/// the signed-in user (if any) and the navigation menu. Handlers layer their
/// page-specific keys on top with `context! { ..., ..chrome.to_value() }`.
#[derive(Debug, Clone)]
pub struct PageChrome {
    app_name: String,
    user: Option<User>,
    menu: Vec<MenuItem>,
    csrf_token: Option<String>,
}

impl PageChrome {
    pub fn new(app_name: &str, user: Option<User>) -> Self {
        let menu = menu_items(user.as_ref());
        Self {
            app_name: app_name.to_string(),
            user,
            menu,
            csrf_token: None,
        }
    }

    /// Attaches the session's form token so templates can embed it in
    /// state-changing forms.
    pub fn with_csrf(mut self, csrf_token: Option<String>) -> Self {
        self.csrf_token = csrf_token;
        self
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            user => &self.user,
            menu => &self.menu,
            csrf_token => &self.csrf_token
        }
    }
}

#[derive(Debug, Clone)]
pub struct ErrorPageContext {
    app_name: String,
    message: Option<String>,
}

impl ErrorPageContext {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            message: None,
        }
    }

    pub fn with_message(app_name: &str, message: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            message: Some(message.to_string()),
        }
    }

    pub fn to_value(&self) -> Value {
        context! {
            app_name => &self.app_name,
            message => &self.message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_carries_the_form_token_when_given() {
        let chrome = PageChrome::new("Flashdeck", None).with_csrf(Some("fct_token".to_string()));
        let value = chrome.to_value();
        assert_eq!(
            value.get_attr("csrf_token").expect("csrf_token").as_str(),
            Some("fct_token")
        );
    }

    #[test]
    fn anonymous_chrome_has_no_user_key_value() {
        let chrome = PageChrome::new("Flashdeck", None);
        let value = chrome.to_value();
        assert!(value.get_attr("user").expect("user key").is_none());
        assert_eq!(
            value.get_attr("app_name").expect("app_name").as_str(),
            Some("Flashdeck")
        );
    }
}
