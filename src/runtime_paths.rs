// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::path::{Path, PathBuf};

/// Canonical locations inside the runtime root directory.
#[derive(Debug, Clone)]
pub struct RuntimePaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub db_file: PathBuf,
    pub config_file: PathBuf,
}

impl RuntimePaths {
    pub fn from_root(root: &Path) -> Self {
        let data_dir = root.join("data");
        Self {
            root: root.to_path_buf(),
            db_file: data_dir.join("flashdeck.sqlite3"),
            data_dir,
            config_file: root.join("config.yaml"),
        }
    }

    pub fn ensure_layout(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
