//! Session and identity provider.
//!
//! Tracks whether a user is authenticated and owns the bearer token's
//! lifecycle. The token lives in session storage under a fixed key; the
//! [`crate::api::ApiClient`] reads it per request, so login and logout take
//! effect on the very next call.
//!
//! The cart store branches on [`Identity`]: authenticated sessions sync to
//! the server, anonymous sessions stay in local storage.

use secrecy::ExposeSecret;
use tracing::{info, instrument, warn};

use stride_core::{Email, UserId};

use crate::api::{ApiError, AuthTransport};
use crate::storage::{SharedStorage, keys};
use crate::types::User;

/// Minimal identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub is_admin: bool,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

/// Whether the session is authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Authenticated(CurrentUser),
}

impl Identity {
    /// Whether this identity is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }
}

/// Explicit session provider with an `initialize`/`teardown` lifecycle.
///
/// Generic over the auth transport so the token lifecycle can be tested
/// against an in-memory fake; production code uses
/// [`crate::api::ApiClient`].
pub struct SessionProvider<T: AuthTransport> {
    api: T,
    storage: SharedStorage,
    identity: Identity,
}

impl<T: AuthTransport> SessionProvider<T> {
    /// Create a provider with an anonymous identity.
    ///
    /// Call [`Self::initialize`] to restore a previous session from the
    /// persisted token.
    #[must_use]
    pub const fn new(api: T, storage: SharedStorage) -> Self {
        Self {
            api,
            storage,
            identity: Identity::Anonymous,
        }
    }

    /// The current identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Restore the session from a persisted token, if one exists.
    ///
    /// Fetches the profile to validate the token. A rejected token is removed
    /// and the session stays anonymous; any other failure also degrades to
    /// anonymous but keeps the token so a transient outage does not log the
    /// user out.
    #[instrument(skip(self))]
    pub async fn initialize(&mut self) {
        if self.storage.get(keys::TOKEN).is_none() {
            return;
        }

        match self.api.profile().await {
            Ok(user) => {
                info!(user_id = %user.id, "Restored session from persisted token");
                self.identity = Identity::Authenticated(CurrentUser::from(&user));
            }
            Err(ApiError::Unauthorized) => {
                warn!("Persisted token rejected, clearing it");
                self.storage.remove(keys::TOKEN);
                self.identity = Identity::Anonymous;
            }
            Err(e) => {
                warn!("Failed to restore session: {e}");
                self.identity = Identity::Anonymous;
            }
        }
    }

    /// Log in with email and password.
    ///
    /// On success the token is persisted and the identity becomes
    /// authenticated.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on bad credentials, or another
    /// error if the request fails. The identity is unchanged on error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&mut self, email: &str, password: &str) -> Result<CurrentUser, ApiError> {
        let success = self.api.login(email, password).await?;
        Ok(self.establish(success.token.expose_secret(), &success.user))
    }

    /// Register a new account and log in as it.
    ///
    /// # Errors
    ///
    /// Returns an error if registration fails. The identity is unchanged on
    /// error.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, ApiError> {
        let success = self.api.register(name, email, password).await?;
        Ok(self.establish(success.token.expose_secret(), &success.user))
    }

    /// Log out: drop the token and return to anonymous.
    ///
    /// Purely local; the backend's stateless tokens just expire.
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        self.storage.remove(keys::TOKEN);
        self.identity = Identity::Anonymous;
        info!("Session torn down");
    }

    fn establish(&mut self, token: &str, user: &User) -> CurrentUser {
        self.storage.set(keys::TOKEN, token);
        let current = CurrentUser::from(user);
        self.identity = Identity::Authenticated(current.clone());
        info!(user_id = %user.id, "Session established");
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use secrecy::SecretString;

    use crate::api::auth::AuthSuccess;
    use crate::storage::{KeyValueStorage, MemoryStorage};

    enum ProfileBehavior {
        Accept,
        Reject,
        Outage,
    }

    struct FakeAuthApi {
        profile_behavior: ProfileBehavior,
        profile_calls: AtomicUsize,
    }

    impl FakeAuthApi {
        fn new(profile_behavior: ProfileBehavior) -> Arc<Self> {
            Arc::new(Self {
                profile_behavior,
                profile_calls: AtomicUsize::new(0),
            })
        }
    }

    impl AuthTransport for FakeAuthApi {
        async fn login(&self, _email: &str, _password: &str) -> Result<AuthSuccess, ApiError> {
            Ok(AuthSuccess {
                token: SecretString::from("issued-token".to_owned()),
                user: sample_user(),
            })
        }

        async fn register(
            &self,
            _name: &str,
            _email: &str,
            _password: &str,
        ) -> Result<AuthSuccess, ApiError> {
            Ok(AuthSuccess {
                token: SecretString::from("issued-token".to_owned()),
                user: sample_user(),
            })
        }

        async fn profile(&self) -> Result<User, ApiError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            match self.profile_behavior {
                ProfileBehavior::Accept => Ok(sample_user()),
                ProfileBehavior::Reject => Err(ApiError::Unauthorized),
                ProfileBehavior::Outage => Err(ApiError::Status {
                    status: 500,
                    message: "backend down".to_owned(),
                }),
            }
        }
    }

    fn provider(
        api: &Arc<FakeAuthApi>,
        storage: &Arc<MemoryStorage>,
    ) -> SessionProvider<Arc<FakeAuthApi>> {
        SessionProvider::new(Arc::clone(api), Arc::clone(storage) as SharedStorage)
    }

    fn sample_user() -> User {
        serde_json::from_value(serde_json::json!({
            "_id": "66f0cccc0000000000000001",
            "name": "Ada",
            "email": "ada@example.com",
            "isAdmin": true
        }))
        .expect("sample user")
    }

    #[test]
    fn test_identity_default_is_anonymous() {
        let identity = Identity::default();
        assert!(!identity.is_authenticated());
        assert!(identity.user().is_none());
    }

    #[test]
    fn test_current_user_from_profile() {
        let user = sample_user();
        let current = CurrentUser::from(&user);
        assert_eq!(current.name, "Ada");
        assert!(current.is_admin);

        let identity = Identity::Authenticated(current);
        assert!(identity.is_authenticated());
        assert_eq!(identity.user().map(|u| u.id.as_str()), Some("66f0cccc0000000000000001"));
    }

    #[tokio::test]
    async fn test_initialize_restores_valid_token() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "persisted-token");
        let api = FakeAuthApi::new(ProfileBehavior::Accept);

        let mut session = provider(&api, &storage);
        session.initialize().await;

        assert!(session.identity().is_authenticated());
        assert_eq!(storage.get(keys::TOKEN), Some("persisted-token".to_owned()));
        assert_eq!(api.profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_initialize_clears_rejected_token() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "stale-token");
        let api = FakeAuthApi::new(ProfileBehavior::Reject);

        let mut session = provider(&api, &storage);
        session.initialize().await;

        assert!(!session.identity().is_authenticated());
        assert_eq!(storage.get(keys::TOKEN), None);
    }

    #[tokio::test]
    async fn test_initialize_keeps_token_through_outage() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(keys::TOKEN, "good-token");
        let api = FakeAuthApi::new(ProfileBehavior::Outage);

        let mut session = provider(&api, &storage);
        session.initialize().await;

        // A transient failure must not log the user out for good
        assert!(!session.identity().is_authenticated());
        assert_eq!(storage.get(keys::TOKEN), Some("good-token".to_owned()));
    }

    #[tokio::test]
    async fn test_initialize_without_token_skips_validation() {
        let storage = Arc::new(MemoryStorage::new());
        let api = FakeAuthApi::new(ProfileBehavior::Accept);

        let mut session = provider(&api, &storage);
        session.initialize().await;

        assert!(!session.identity().is_authenticated());
        assert_eq!(api.profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_login_persists_token_and_teardown_removes_it() {
        let storage = Arc::new(MemoryStorage::new());
        let api = FakeAuthApi::new(ProfileBehavior::Accept);

        let mut session = provider(&api, &storage);
        let user = session.login("ada@example.com", "hunter2").await.expect("login");
        assert_eq!(user.name, "Ada");
        assert!(session.identity().is_authenticated());
        assert_eq!(storage.get(keys::TOKEN), Some("issued-token".to_owned()));

        session.teardown();
        assert!(!session.identity().is_authenticated());
        assert_eq!(storage.get(keys::TOKEN), None);
    }
}
