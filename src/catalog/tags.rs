// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

/// Splits a raw comma-separated tag string into candidate tag names.
///
/// Pieces are trimmed and empty pieces dropped; order is preserved.
/// Duplicates are kept here: get-or-create is idempotent per name, so a
/// repeated name still yields a single association downstream.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
