//! In-process session state and its durable backing

use scribe_core::CoreResult;
use scribe_core::store::{SessionStore, keys};
use scribe_core::types::{TokenPair, User};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

/// Mutable session contents
#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    current_user: Option<User>,
    /// Bumped whenever the token pair is installed or cleared
    epoch: u64,
}

/// Shared handle over the session and its durable store
///
/// The token pair is installed and cleared as a unit. Writes to the store
/// after construction are best-effort: the in-memory session stays
/// authoritative and failures are logged.
#[derive(Clone)]
pub(crate) struct SessionHandle {
    state: Arc<RwLock<SessionState>>,
    store: Arc<dyn SessionStore>,
}

impl SessionHandle {
    pub(crate) fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            store,
        }
    }

    /// Load whatever the store holds; tokens count only as a pair
    pub(crate) async fn restore(&self) -> CoreResult<()> {
        let access = self.store.get(keys::ACCESS_TOKEN).await?;
        let refresh = self.store.get(keys::REFRESH_TOKEN).await?;
        let user = self.store.get(keys::CURRENT_USER).await?;

        let mut state = self.state.write().await;
        if let (Some(access), Some(refresh)) = (access, refresh) {
            state.access_token = Some(access);
            state.refresh_token = Some(refresh);
        }
        state.current_user = user.and_then(|raw| match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!("Ignoring unreadable stored user snapshot: {err}");
                None
            }
        });
        Ok(())
    }

    pub(crate) async fn access_token(&self) -> Option<String> {
        self.state.read().await.access_token.clone()
    }

    pub(crate) async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.refresh_token.clone()
    }

    /// Access token and epoch read under one lock, so the epoch always
    /// describes the token actually attached to a request
    pub(crate) async fn access_snapshot(&self) -> (Option<String>, u64) {
        let state = self.state.read().await;
        (state.access_token.clone(), state.epoch)
    }

    /// Refresh token and epoch read under one lock
    pub(crate) async fn refresh_snapshot(&self) -> (Option<String>, u64) {
        let state = self.state.read().await;
        (state.refresh_token.clone(), state.epoch)
    }

    pub(crate) async fn epoch(&self) -> u64 {
        self.state.read().await.epoch
    }

    pub(crate) async fn is_authenticated(&self) -> bool {
        self.state.read().await.access_token.is_some()
    }

    pub(crate) async fn current_user(&self) -> Option<User> {
        self.state.read().await.current_user.clone()
    }

    /// Replace the token pair, as the refresh endpoint does
    pub(crate) async fn install_tokens(&self, tokens: &TokenPair) {
        {
            let mut state = self.state.write().await;
            state.access_token = Some(tokens.access_token.clone());
            state.refresh_token = Some(tokens.refresh_token.clone());
            state.epoch += 1;
        }
        self.persist_tokens(tokens).await;
    }

    /// Install a full session, as login and registration do
    pub(crate) async fn install(&self, tokens: &TokenPair, user: &User) {
        {
            let mut state = self.state.write().await;
            state.access_token = Some(tokens.access_token.clone());
            state.refresh_token = Some(tokens.refresh_token.clone());
            state.current_user = Some(user.clone());
            state.epoch += 1;
        }
        self.persist_tokens(tokens).await;
        self.persist_user(user).await;
    }

    /// Replace the cached user snapshot
    pub(crate) async fn set_user(&self, user: &User) {
        self.state.write().await.current_user = Some(user.clone());
        self.persist_user(user).await;
    }

    /// Drop tokens and snapshot together, in memory and in the store
    pub(crate) async fn clear(&self) {
        {
            let mut state = self.state.write().await;
            state.access_token = None;
            state.refresh_token = None;
            state.current_user = None;
            state.epoch += 1;
        }
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN, keys::CURRENT_USER] {
            if let Err(err) = self.store.remove(key).await {
                warn!("Failed to remove {key} from the session store: {err}");
            }
        }
    }

    async fn persist_tokens(&self, tokens: &TokenPair) {
        if let Err(err) = self
            .store
            .set(keys::ACCESS_TOKEN, &tokens.access_token)
            .await
        {
            warn!("Failed to persist access token: {err}");
        }
        if let Err(err) = self
            .store
            .set(keys::REFRESH_TOKEN, &tokens.refresh_token)
            .await
        {
            warn!("Failed to persist refresh token: {err}");
        }
    }

    async fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(err) = self.store.set(keys::CURRENT_USER, &raw).await {
                    warn!("Failed to persist user snapshot: {err}");
                }
            }
            Err(err) => warn!("Failed to encode user snapshot: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_core::CoreError;
    use scribe_core::store::MemoryStore;
    use scribe_core::store::mock::MockSessionStore;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access_token: access.into(),
            refresh_token: refresh.into(),
        }
    }

    fn user(name: &str) -> User {
        User {
            id: "u1".into(),
            name: name.into(),
            email: "ada@example.com".into(),
            profile: None,
        }
    }

    #[tokio::test]
    async fn restores_complete_session() {
        let store = MemoryStore::new();
        store.set(keys::ACCESS_TOKEN, "t1").await.unwrap();
        store.set(keys::REFRESH_TOKEN, "r1").await.unwrap();
        store
            .set(
                keys::CURRENT_USER,
                &serde_json::to_string(&user("Ada")).unwrap(),
            )
            .await
            .unwrap();

        let handle = SessionHandle::new(Arc::new(store));
        handle.restore().await.unwrap();

        assert!(handle.is_authenticated().await);
        assert_eq!(handle.access_token().await.as_deref(), Some("t1"));
        assert_eq!(handle.current_user().await.unwrap().name, "Ada");
    }

    #[tokio::test]
    async fn ignores_lone_access_token() {
        let store = MemoryStore::new();
        store.set(keys::ACCESS_TOKEN, "t1").await.unwrap();

        let handle = SessionHandle::new(Arc::new(store));
        handle.restore().await.unwrap();

        assert!(!handle.is_authenticated().await);
        assert_eq!(handle.refresh_token().await, None);
    }

    #[tokio::test]
    async fn ignores_corrupt_user_snapshot() {
        let store = MemoryStore::new();
        store.set(keys::ACCESS_TOKEN, "t1").await.unwrap();
        store.set(keys::REFRESH_TOKEN, "r1").await.unwrap();
        store.set(keys::CURRENT_USER, "{not json").await.unwrap();

        let handle = SessionHandle::new(Arc::new(store));
        handle.restore().await.unwrap();

        assert!(handle.is_authenticated().await);
        assert_eq!(handle.current_user().await, None);
    }

    #[tokio::test]
    async fn clear_removes_every_key() {
        let store = Arc::new(MemoryStore::new());
        let handle = SessionHandle::new(store.clone());
        handle.install(&pair("t1", "r1"), &user("Ada")).await;
        assert!(store.get(keys::CURRENT_USER).await.unwrap().is_some());

        handle.clear().await;

        assert!(!handle.is_authenticated().await);
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN, keys::CURRENT_USER] {
            assert_eq!(store.get(key).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn install_and_clear_bump_the_epoch() {
        let handle = SessionHandle::new(Arc::new(MemoryStore::new()));
        let start = handle.epoch().await;

        handle.install_tokens(&pair("t1", "r1")).await;
        let installed = handle.epoch().await;
        assert!(installed > start);

        handle.clear().await;
        assert!(handle.epoch().await > installed);
    }

    #[tokio::test]
    async fn store_failures_do_not_lose_the_session() {
        let mut store = MockSessionStore::new();
        store
            .expect_set()
            .returning(|_, _| Err(CoreError::io_error("disk full")));
        let handle = SessionHandle::new(Arc::new(store));

        handle.install_tokens(&pair("t1", "r1")).await;

        assert!(handle.is_authenticated().await);
        assert_eq!(handle.refresh_token().await.as_deref(), Some("r1"));
    }
}
