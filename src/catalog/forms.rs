// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::models::Category;
use crate::users::forms::FieldError;
use serde::Deserialize;

const MAX_QUESTION_LEN: usize = 255;
const MAX_ANSWER_LEN: usize = 5000;

/// Raw add-card submission as posted by the form.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCardInput {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub csrf_token: String,
}

/// A submission that passed validation: trimmed text plus a category id
/// confirmed against the live category list.
#[derive(Debug, Clone)]
pub struct ValidAddCard {
    pub question: String,
    pub answer: String,
    pub category_id: i64,
}

pub fn validate_add_card(
    input: &AddCardInput,
    categories: &[Category],
) -> Result<ValidAddCard, Vec<FieldError>> {
    let mut errors = Vec::new();

    let question = input.question.trim();
    if question.is_empty() {
        errors.push(FieldError {
            field: "question",
            message: "Question is required".to_string(),
        });
    } else if question.chars().count() > MAX_QUESTION_LEN {
        errors.push(FieldError {
            field: "question",
            message: format!("Question must be at most {} characters", MAX_QUESTION_LEN),
        });
    }

    let answer = input.answer.trim();
    if answer.is_empty() {
        errors.push(FieldError {
            field: "answer",
            message: "Answer is required".to_string(),
        });
    } else if answer.chars().count() > MAX_ANSWER_LEN {
        errors.push(FieldError {
            field: "answer",
            message: format!("Answer must be at most {} characters", MAX_ANSWER_LEN),
        });
    }

    let category_id = match input.category.trim().parse::<i64>() {
        Ok(id) if categories.iter().any(|category| category.id == id) => Some(id),
        _ => {
            errors.push(FieldError {
                field: "category",
                message: "Choose a category from the list".to_string(),
            });
            None
        }
    };

    match (errors.is_empty(), category_id) {
        (true, Some(category_id)) => Ok(ValidAddCard {
            question: question.to_string(),
            answer: answer.to_string(),
            category_id,
        }),
        _ => Err(errors),
    }
}
