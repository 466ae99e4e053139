// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::users::models::User;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub title: String,
    pub path: String,
}

impl MenuItem {
    fn new(title: &str, path: &str) -> Self {
        Self {
            title: title.to_string(),
            path: path.to_string(),
        }
    }
}

/// Builds the top navigation for the current visitor. Every page shares this
/// menu; entries appear as the visitor's privileges allow.
pub fn menu_items(user: Option<&User>) -> Vec<MenuItem> {
    let mut items = vec![
        MenuItem::new("Home", "/"),
        MenuItem::new("Catalog", "/cards/catalog/"),
        MenuItem::new("About", "/about/"),
    ];
    if user.is_some() {
        items.push(MenuItem::new("Add card", "/cards/add_card/"));
    }
    if user.map(|user| user.is_operator).unwrap_or(false) {
        items.push(MenuItem::new("Card review", "/admin/cards/"));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn visitor(is_operator: bool) -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            photo: None,
            date_birth: None,
            is_operator,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_menu_is_public_pages_only() {
        let titles: Vec<String> = menu_items(None).into_iter().map(|item| item.title).collect();
        assert_eq!(titles, vec!["Home", "Catalog", "About"]);
    }

    #[test]
    fn signed_in_menu_gains_add_card() {
        let user = visitor(false);
        let titles: Vec<String> = menu_items(Some(&user))
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert!(titles.contains(&"Add card".to_string()));
        assert!(!titles.contains(&"Card review".to_string()));
    }

    #[test]
    fn operator_menu_gains_review() {
        let user = visitor(true);
        let titles: Vec<String> = menu_items(Some(&user))
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert!(titles.contains(&"Card review".to_string()));
    }
}
