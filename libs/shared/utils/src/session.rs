use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::{AuthSession, Role};

pub const SESSION_LIFETIME_DAYS: i64 = 7;

fn lifetime() -> Duration {
    Duration::days(SESSION_LIFETIME_DAYS)
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// In-process session registry. Sessions live 7 days from login and the
/// expiry slides forward on every authenticated request. Constructed once at
/// startup and injected; clones share the same map.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a fresh session for a user. Always mints a new id; callers
    /// implementing clear-then-set revoke the old session first.
    pub async fn create(&self, user_id: &str, role: Role) -> Uuid {
        let session_id = Uuid::new_v4();
        let now = Utc::now();
        let session = Session {
            user_id: user_id.to_string(),
            role,
            created_at: now,
            last_seen_at: now,
            expires_at: now + lifetime(),
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(session_id, session);
        debug!("Session {} opened for user {}", session_id, user_id);
        session_id
    }

    /// Resolve a session id to an authenticated identity, sliding its expiry
    /// forward. Expired sessions are removed on sight.
    pub async fn authenticate(&self, session_id: Uuid) -> Option<AuthSession> {
        self.authenticate_at(session_id, Utc::now()).await
    }

    /// Clock-explicit variant of [`SessionStore::authenticate`].
    pub async fn authenticate_at(
        &self,
        session_id: Uuid,
        now: DateTime<Utc>,
    ) -> Option<AuthSession> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&session_id)?;

        if session.expires_at <= now {
            debug!("Session {} expired, removing", session_id);
            sessions.remove(&session_id);
            return None;
        }

        session.last_seen_at = now;
        session.expires_at = now + lifetime();

        Some(AuthSession {
            session_id,
            user_id: session.user_id.clone(),
            role: session.role,
        })
    }

    /// Remove a session. Revoking an unknown id is a no-op.
    pub async fn revoke(&self, session_id: Uuid) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(&session_id).is_some() {
            debug!("Session {} revoked", session_id);
        }
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn authenticate_returns_the_identity_it_was_created_with() {
        let store = SessionStore::new();
        let session_id = store.create("u-1", Role::Patient).await;

        let auth = store.authenticate(session_id).await.unwrap();
        assert_eq!(auth.user_id, "u-1");
        assert_eq!(auth.role, Role::Patient);
        assert_eq!(auth.session_id, session_id);
    }

    #[tokio::test]
    async fn repeated_authentication_is_idempotent_on_identity() {
        let store = SessionStore::new();
        let session_id = store.create("u-1", Role::Doctor).await;

        let first = store.authenticate(session_id).await.unwrap();
        let second = store.authenticate(session_id).await.unwrap();
        assert_eq!(first.user_id, second.user_id);
        assert_eq!(first.role, second.role);
        assert_eq!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn sessions_expire_after_seven_days_of_silence() {
        let store = SessionStore::new();
        let session_id = store.create("u-1", Role::Patient).await;
        let now = Utc::now();

        let gone = store
            .authenticate_at(session_id, now + Duration::days(8))
            .await;
        assert!(gone.is_none(), "Idle session past lifetime must expire");

        // Expired sessions are dropped, not resurrected by an earlier clock.
        assert!(store.authenticate_at(session_id, now).await.is_none());
    }

    #[tokio::test]
    async fn activity_slides_the_expiry_forward() {
        let store = SessionStore::new();
        let session_id = store.create("u-1", Role::Patient).await;
        let now = Utc::now();

        // Touch on day 6, then come back on day 12: still inside the
        // refreshed window.
        assert!(store
            .authenticate_at(session_id, now + Duration::days(6))
            .await
            .is_some());
        assert!(store
            .authenticate_at(session_id, now + Duration::days(12))
            .await
            .is_some());

        // Day 14 is past the day-12 refresh window.
        assert!(store
            .authenticate_at(session_id, now + Duration::days(20))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn revoke_is_idempotent() {
        let store = SessionStore::new();
        let session_id = store.create("u-1", Role::Patient).await;

        store.revoke(session_id).await;
        store.revoke(session_id).await;
        assert!(store.authenticate(session_id).await.is_none());
        assert_eq!(store.active_count().await, 0);
    }
}
