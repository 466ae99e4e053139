// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::models::{Card, CardPage, Category, NewCard, Tag};
use super::query::{CatalogQuery, Page};
use crate::db::{Database, StoreError};
use chrono::Utc;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: row.get(0)?,
        question: row.get(1)?,
        answer: row.get(2)?,
        category_id: row.get(3)?,
        category_name: row.get(4)?,
        upload_date: row.get(5)?,
        views: row.get(6)?,
        favorites: row.get(7)?,
        check_status: row.get(8)?,
        author_id: row.get(9)?,
    })
}

const CARD_COLUMNS: &str = "c.id, c.question, c.answer, c.category_id, cat.name, \
     c.upload_date, c.views, c.favorites, c.check_status, c.author_id";

/// Runs a catalog query and returns one page of results together with the
/// total match count.
pub fn list_cards(
    db: &Database,
    query: &CatalogQuery,
    page: Page,
) -> Result<CardPage, StoreError> {
    let plan = query.plan(page);
    let conn = db.conn();

    let mut stmt = conn.prepare(&plan.select_sql)?;
    let cards = stmt
        .query_map(params_from_iter(plan.select_params), card_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let total: u64 = conn.query_row(
        &plan.count_sql,
        params_from_iter(plan.count_params),
        |row| row.get(0),
    )?;

    Ok(CardPage::new(cards, total, page.number, page.size))
}

pub fn count_cards(db: &Database) -> Result<u64, StoreError> {
    let conn = db.conn();
    let count = conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))?;
    Ok(count)
}

pub fn get_card(db: &Database, card_id: i64) -> Result<Card, StoreError> {
    let conn = db.conn();
    let sql = format!(
        "SELECT {CARD_COLUMNS} FROM cards c \
         JOIN categories cat ON cat.id = c.category_id WHERE c.id = ?1"
    );
    conn.query_row(&sql, params![card_id], card_from_row)
        .optional()?
        .ok_or(StoreError::NotFound)
}

pub fn tags_for_card(db: &Database, card_id: i64) -> Result<Vec<Tag>, StoreError> {
    let conn = db.conn();
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name FROM tags t \
         JOIN card_tags ct ON ct.tag_id = t.id \
         WHERE ct.card_id = ?1 ORDER BY t.name",
    )?;
    let tags = stmt
        .query_map(params![card_id], |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tags)
}

/// Adds exactly 1 to the stored view counter. The addition is evaluated by
/// the database against the current column value, so concurrent detail-page
/// requests never lose an increment.
pub fn increment_views(db: &Database, card_id: i64) -> Result<(), StoreError> {
    let conn = db.conn();
    let changed = conn.execute(
        "UPDATE cards SET views = views + 1 WHERE id = ?1",
        params![card_id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub fn insert_card(db: &Database, card: &NewCard) -> Result<i64, StoreError> {
    let conn = db.conn();
    conn.execute(
        "INSERT INTO cards (question, answer, category_id, upload_date, author_id) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            card.question,
            card.answer,
            card.category_id,
            Utc::now(),
            card.author_id
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_tag(db: &Database, tag_id: i64) -> Result<Tag, StoreError> {
    let conn = db.conn();
    conn.query_row(
        "SELECT id, name FROM tags WHERE id = ?1",
        params![tag_id],
        |row| {
            Ok(Tag {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        },
    )
    .optional()?
    .ok_or(StoreError::NotFound)
}

/// Looks up a tag by exact name, creating it when absent.
///
/// Two requests can race on the same new name; the unique index makes one
/// insert fail, and the loser reloads the winner's row instead of
/// surfacing the violation.
pub fn get_or_create_tag(db: &Database, name: &str) -> Result<Tag, StoreError> {
    let conn = db.conn();
    let lookup = |conn: &rusqlite::Connection| -> Result<Option<Tag>, StoreError> {
        let found = conn
            .query_row(
                "SELECT id, name FROM tags WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    };

    if let Some(tag) = lookup(&conn)? {
        return Ok(tag);
    }

    match conn.execute("INSERT INTO tags (name) VALUES (?1)", params![name]) {
        Ok(_) => Ok(Tag {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        }),
        Err(err) => {
            let err = StoreError::from(err);
            if err.is_constraint() {
                lookup(&conn)?.ok_or(err)
            } else {
                Err(err)
            }
        }
    }
}

/// Resolves candidate tag names and associates each with the card.
///
/// Must run after the card row exists: the join row's foreign key needs a
/// durable card id. The unique (card, tag) constraint plus INSERT OR IGNORE
/// makes repeated names collapse into one association.
pub fn attach_tags(db: &Database, card_id: i64, names: &[String]) -> Result<(), StoreError> {
    for name in names {
        let tag = get_or_create_tag(db, name)?;
        let conn = db.conn();
        conn.execute(
            "INSERT OR IGNORE INTO card_tags (card_id, tag_id) VALUES (?1, ?2)",
            params![card_id, tag.id],
        )?;
    }
    Ok(())
}

pub fn list_categories(db: &Database) -> Result<Vec<Category>, StoreError> {
    let conn = db.conn();
    let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY name")?;
    let categories = stmt
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn create_category(db: &Database, name: &str) -> Result<Category, StoreError> {
    let conn = db.conn();
    conn.execute("INSERT INTO categories (name) VALUES (?1)", params![name])?;
    Ok(Category {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
    })
}

/// Flips the checked/unchecked flag and reports the new value.
pub fn toggle_check_status(db: &Database, card_id: i64) -> Result<bool, StoreError> {
    let conn = db.conn();
    let changed = conn.execute(
        "UPDATE cards SET check_status = NOT check_status WHERE id = ?1",
        params![card_id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    let status = conn.query_row(
        "SELECT check_status FROM cards WHERE id = ?1",
        params![card_id],
        |row| row.get(0),
    )?;
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::query::{SortField, SortOrder};

    fn test_db() -> Database {
        Database::open_in_memory().expect("in-memory db")
    }

    fn seed_card(db: &Database, question: &str, answer: &str, category_id: i64) -> i64 {
        insert_card(
            db,
            &NewCard {
                question: question.to_string(),
                answer: answer.to_string(),
                category_id,
                author_id: None,
            },
        )
        .expect("insert card")
    }

    #[test]
    fn increment_is_relative_to_stored_value() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        let card_id = seed_card(&db, "Q", "A", category.id);

        for _ in 0..5 {
            increment_views(&db, card_id).expect("increment");
        }

        let card = get_card(&db, card_id).expect("card");
        assert_eq!(card.views, 5);
    }

    #[test]
    fn increment_unknown_card_is_not_found() {
        let db = test_db();
        assert!(matches!(
            increment_views(&db, 999),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn get_or_create_returns_existing_row() {
        let db = test_db();
        let first = get_or_create_tag(&db, "history").expect("create");
        let second = get_or_create_tag(&db, "history").expect("reuse");
        assert_eq!(first.id, second.id);

        let conn = db.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn tag_names_are_case_sensitive_for_lookup() {
        let db = test_db();
        let lower = get_or_create_tag(&db, "history").expect("lower");
        let upper = get_or_create_tag(&db, "History").expect("upper");
        assert_ne!(lower.id, upper.id);
    }

    #[test]
    fn duplicate_names_in_one_input_yield_one_association() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        let card_id = seed_card(&db, "Q", "A", category.id);

        let names = vec![
            "history".to_string(),
            "science".to_string(),
            "history".to_string(),
        ];
        attach_tags(&db, card_id, &names).expect("attach");

        let tags = tags_for_card(&db, card_id).expect("tags");
        let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
        assert_eq!(names, vec!["history", "science"]);
    }

    #[test]
    fn same_tag_on_two_cards_is_one_entity() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        let first = seed_card(&db, "Q1", "A1", category.id);
        let second = seed_card(&db, "Q2", "A2", category.id);

        attach_tags(&db, first, &["shared".to_string()]).expect("attach first");
        attach_tags(&db, second, &["shared".to_string()]).expect("attach second");

        let conn = db.conn();
        let tag_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))
            .expect("tags");
        let link_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM card_tags", [], |row| row.get(0))
            .expect("links");
        assert_eq!(tag_count, 1);
        assert_eq!(link_count, 2);
    }

    #[test]
    fn search_matches_question_answer_and_tag_without_duplicates() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        let by_question = seed_card(&db, "Rust ownership", "moves", category.id);
        let by_answer = seed_card(&db, "Q2", "borrow checker in Rust", category.id);
        let by_tags = seed_card(&db, "Q3", "A3", category.id);
        let unrelated = seed_card(&db, "Q4", "A4", category.id);
        // Two matching tags on one card must not duplicate it in the results
        attach_tags(
            &db,
            by_tags,
            &["rust-lang".to_string(), "rusty".to_string()],
        )
        .expect("attach");
        attach_tags(&db, unrelated, &["cooking".to_string()]).expect("attach");

        let query = CatalogQuery::from_params(None, None, Some("rust")).expect("query");
        let page = list_cards(&db, &query, Page { number: 1, size: 30 }).expect("list");

        let mut ids: Vec<i64> = page.cards.iter().map(|card| card.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![by_question, by_answer, by_tags]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn listing_sorts_by_views_with_id_tiebreak() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        let first = seed_card(&db, "Q1", "A1", category.id);
        let second = seed_card(&db, "Q2", "A2", category.id);
        let third = seed_card(&db, "Q3", "A3", category.id);
        increment_views(&db, second).expect("bump");

        let query = CatalogQuery {
            sort: SortField::Views,
            order: SortOrder::Asc,
            ..CatalogQuery::default()
        };
        let page = list_cards(&db, &query, Page { number: 1, size: 30 }).expect("list");
        let ids: Vec<i64> = page.cards.iter().map(|card| card.id).collect();
        assert_eq!(ids, vec![first, third, second]);
    }

    #[test]
    fn tag_restriction_limits_the_listing() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        let tagged = seed_card(&db, "Q1", "A1", category.id);
        let _plain = seed_card(&db, "Q2", "A2", category.id);
        attach_tags(&db, tagged, &["physics".to_string()]).expect("attach");
        let tag = get_or_create_tag(&db, "physics").expect("tag");

        let query = CatalogQuery::default().with_tag(tag.id);
        let page = list_cards(&db, &query, Page { number: 1, size: 30 }).expect("list");
        assert_eq!(page.cards.len(), 1);
        assert_eq!(page.cards[0].id, tagged);
    }

    #[test]
    fn pagination_returns_disjoint_pages() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        for i in 0..5 {
            seed_card(&db, &format!("Q{}", i), "A", category.id);
        }

        let query = CatalogQuery::default();
        let first = list_cards(&db, &query, Page { number: 1, size: 2 }).expect("page 1");
        let second = list_cards(&db, &query, Page { number: 2, size: 2 }).expect("page 2");
        assert_eq!(first.total, 5);
        assert_eq!(first.page_count, 3);
        assert_eq!(first.cards.len(), 2);
        assert_eq!(second.cards.len(), 2);
        for card in &second.cards {
            assert!(first.cards.iter().all(|other| other.id != card.id));
        }
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        seed_card(&db, "Q", "A", category.id);

        let query = CatalogQuery::default();
        let page = list_cards(&db, &query, Page { number: 9, size: 30 }).expect("list");
        assert!(page.cards.is_empty());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn toggle_check_status_round_trips() {
        let db = test_db();
        let category = create_category(&db, "Science").expect("category");
        let card_id = seed_card(&db, "Q", "A", category.id);

        assert!(toggle_check_status(&db, card_id).expect("first toggle"));
        assert!(!toggle_check_status(&db, card_id).expect("second toggle"));
    }
}
