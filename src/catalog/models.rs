// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A question/answer flashcard record.
#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category_id: i64,
    pub category_name: String,
    pub upload_date: DateTime<Utc>,
    pub views: i64,
    pub favorites: i64,
    pub check_status: bool,
    pub author_id: Option<i64>,
}

/// Field values for a card about to be persisted. Tags are attached
/// separately once the card row exists.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub question: String,
    pub answer: String,
    pub category_id: i64,
    pub author_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// One page of catalog results plus the figures the template needs to
/// render pagination controls.
#[derive(Debug, Serialize)]
pub struct CardPage {
    pub cards: Vec<Card>,
    pub total: u64,
    pub page_number: u32,
    pub page_count: u32,
}

impl CardPage {
    pub fn new(cards: Vec<Card>, total: u64, page_number: u32, page_size: u32) -> Self {
        let page_count = if total == 0 {
            1
        } else {
            ((total + u64::from(page_size) - 1) / u64::from(page_size)) as u32
        };
        Self {
            cards,
            total,
            page_number,
            page_count,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.page_count
    }
}
