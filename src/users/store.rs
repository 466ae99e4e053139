// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use super::models::{NewUser, ProfileUpdate, User};
use crate::db::{Database, StoreError};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        photo: row.get(5)?,
        date_birth: row.get(6)?,
        is_operator: row.get(7)?,
        joined_at: row.get(8)?,
    })
}

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, photo, date_birth, is_operator, joined_at";

pub fn insert_user(db: &Database, user: &NewUser) -> Result<i64, StoreError> {
    let conn = db.conn();
    conn.execute(
        "INSERT INTO users (username, email, password_hash, first_name, last_name, joined_at) \
         VALUES (?1, ?2, ?3, '', '', ?4)",
        params![user.username, user.email, user.password_hash, Utc::now()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_by_id(db: &Database, user_id: i64) -> Result<User, StoreError> {
    let conn = db.conn();
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    conn.query_row(&sql, params![user_id], user_from_row)
        .optional()?
        .ok_or(StoreError::NotFound)
}

pub fn get_by_username(db: &Database, username: &str) -> Result<User, StoreError> {
    let conn = db.conn();
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
    conn.query_row(&sql, params![username], user_from_row)
        .optional()?
        .ok_or(StoreError::NotFound)
}

/// Fetches a user together with the stored password hash for a login check.
/// `None` for an unknown username, so the caller can fail logins uniformly.
pub fn find_credentials(
    db: &Database,
    username: &str,
) -> Result<Option<(User, String)>, StoreError> {
    let conn = db.conn();
    let sql = format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"
    );
    let found = conn
        .query_row(&sql, params![username], |row| {
            let user = user_from_row(row)?;
            let hash: String = row.get(9)?;
            Ok((user, hash))
        })
        .optional()?;
    Ok(found)
}

pub fn update_profile(
    db: &Database,
    user_id: i64,
    update: &ProfileUpdate,
) -> Result<(), StoreError> {
    let conn = db.conn();
    let changed = conn.execute(
        "UPDATE users SET first_name = ?1, last_name = ?2, photo = ?3, \
         date_birth = ?4 WHERE id = ?5",
        params![
            update.first_name,
            update.last_name,
            update.photo,
            update.date_birth,
            user_id
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}

pub fn set_operator(db: &Database, user_id: i64, is_operator: bool) -> Result<(), StoreError> {
    let conn = db.conn();
    let changed = conn.execute(
        "UPDATE users SET is_operator = ?1 WHERE id = ?2",
        params![is_operator, user_id],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound);
    }
    Ok(())
}
