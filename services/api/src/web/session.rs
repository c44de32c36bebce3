//! services/api/src/web/session.rs
//!
//! The browser-session unlock flag.
//!
//! The flag lives in the `gakbbul_unlocked` cookie, issued without `Max-Age`
//! so the browser keeps it for the current session only. The cookie carries an
//! opaque session id; the registry records which ids passed the lock screen.

use axum::http::{header, HeaderMap};
use gakbbul_core::ui::SessionContext;
use std::collections::{HashSet, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "gakbbul_unlocked";

/// Extracts the session id from the request's `Cookie` header.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;

    cookie_header
        .split(';')
        .find_map(|c| {
            let c = c.trim();
            c.strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// A session-scoped cookie: no `Max-Age`, no `Expires`.
pub fn session_cookie(session_id: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, session_id
    )
}

/// Unlocked sessions kept before the oldest one is forgotten.
pub const MAX_UNLOCKED_SESSIONS: usize = 10_000;

#[derive(Debug, Default)]
struct UnlockedSessions {
    ids: HashSet<String>,
    /// Unlock order, oldest first.
    order: VecDeque<String>,
}

/// In-process record of the sessions that passed the lock screen.
///
/// Bounded: past `capacity` entries the oldest unlock is evicted, and that
/// browser sees the lock screen again.
#[derive(Debug)]
pub struct SessionRegistry {
    unlocked: RwLock<UnlockedSessions>,
    capacity: usize,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_capacity(MAX_UNLOCKED_SESSIONS)
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            unlocked: RwLock::new(UnlockedSessions::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Reads the state a new dashboard starts from.
    pub async fn context(&self, session_id: &str) -> SessionContext {
        SessionContext {
            app_unlocked: self.is_unlocked(session_id).await,
        }
    }

    pub async fn is_unlocked(&self, session_id: &str) -> bool {
        self.unlocked.read().await.ids.contains(session_id)
    }

    pub async fn mark_unlocked(&self, session_id: &str) {
        let mut sessions = self.unlocked.write().await;
        if !sessions.ids.insert(session_id.to_string()) {
            return;
        }
        sessions.order.push_back(session_id.to_string());
        while sessions.order.len() > self.capacity {
            if let Some(oldest) = sessions.order.pop_front() {
                sessions.ids.remove(&oldest);
            }
        }
    }
}
