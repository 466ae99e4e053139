// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::config::{load_config, validate_config, ConfigError, RawConfig, ValidatedConfig};
use crate::db::{Database, StoreError};
use crate::runtime_paths::RuntimePaths;
use std::path::Path;

pub struct BootstrapResult {
    pub runtime_paths: RuntimePaths,
    pub validated_config: ValidatedConfig,
    pub created_config: bool,
}

/// Prepares the runtime root: directory layout, then a validated config.
/// A missing config.yaml is written out with defaults so a first run works
/// without any manual setup.
pub fn bootstrap_runtime(root: &Path) -> Result<BootstrapResult, ConfigError> {
    let runtime_paths = RuntimePaths::from_root(root);
    runtime_paths
        .ensure_layout()
        .map_err(|e| ConfigError::LoadError(format!("Failed to create runtime layout: {}", e)))?;

    let mut created_config = false;
    if !runtime_paths.config_file.exists() {
        let defaults = serde_yaml::to_string(&RawConfig::default())
            .map_err(|e| ConfigError::LoadError(format!("Failed to render defaults: {}", e)))?;
        std::fs::write(&runtime_paths.config_file, defaults).map_err(|e| {
            ConfigError::LoadError(format!(
                "Failed to write {}: {}",
                runtime_paths.config_file.display(),
                e
            ))
        })?;
        created_config = true;
    }

    let raw = load_config(&runtime_paths.config_file)?;
    let validated_config = validate_config(raw)?;

    Ok(BootstrapResult {
        runtime_paths,
        validated_config,
        created_config,
    })
}

const STARTER_CATEGORIES: [&str; 4] = ["General", "Science", "History", "Languages"];

/// Gives a brand-new database a usable category list. An existing category
/// table, however it got there, is left alone.
pub fn seed_default_categories(db: &Database) -> Result<(), StoreError> {
    let existing = crate::catalog::store::list_categories(db)?;
    if !existing.is_empty() {
        return Ok(());
    }
    for name in STARTER_CATEGORIES {
        crate::catalog::store::create_category(db, name)?;
    }
    log::info!("Seeded {} starter categories", STARTER_CATEGORIES.len());
    Ok(())
}
