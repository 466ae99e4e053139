// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::{Duration, Instant};

const MAX_SESSIONS: usize = 10000;

#[derive(Debug, Clone)]
struct SessionRecord {
    user_id: i64,
    expires_at: Instant,
}

/// In-memory session table keyed by opaque cookie value. Sessions do not
/// survive a restart; users sign in again.
pub struct SessionStore {
    inner: RwLock<SessionState>,
    ttl: Duration,
}

struct SessionState {
    sessions: HashMap<String, SessionRecord>,
    session_order: VecDeque<String>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(SessionState {
                sessions: HashMap::new(),
                session_order: VecDeque::new(),
            }),
            ttl,
        }
    }

    /// Creates a session for the user and returns the cookie value.
    pub fn issue(&self, user_id: i64) -> String {
        let session_id = generate_session_id();
        let now = Instant::now();
        let mut state = self.write();
        state.cleanup_expired(now);
        state.sessions.insert(
            session_id.clone(),
            SessionRecord {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        state.session_order.push_back(session_id.clone());
        state.prune_overflow();
        session_id
    }

    /// Maps a cookie value back to a user id. Expired entries are treated as
    /// absent and dropped on the spot.
    pub fn resolve(&self, session_id: &str) -> Option<i64> {
        let now = Instant::now();
        let mut state = self.write();
        match state.sessions.get(session_id) {
            Some(record) if record.expires_at > now => Some(record.user_id),
            Some(_) => {
                state.remove(session_id);
                None
            }
            None => None,
        }
    }

    pub fn invalidate(&self, session_id: &str) {
        let mut state = self.write();
        state.remove(session_id);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        match self.inner.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Session store lock poisoned; recovering");
                poisoned.into_inner()
            }
        }
    }
}

impl SessionState {
    fn remove(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
        self.session_order.retain(|id| id != session_id);
    }

    fn cleanup_expired(&mut self, now: Instant) {
        self.sessions.retain(|_, record| record.expires_at > now);
        self.session_order
            .retain(|id| self.sessions.contains_key(id));
    }

    fn prune_overflow(&mut self) {
        while self.sessions.len() > MAX_SESSIONS {
            if let Some(oldest) = self.session_order.pop_front() {
                self.sessions.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; 18];
    OsRng.fill_bytes(&mut bytes);
    format!("fds_{}", URL_SAFE_NO_PAD.encode(bytes))
}
