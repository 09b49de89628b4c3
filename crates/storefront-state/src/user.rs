//! # User Store
//!
//! Authentication and the session token.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Session Flow                                    │
//! │                                                                         │
//! │  login_with_email ──► POST /auth/login ──► { token, user }              │
//! │                                              │                          │
//! │                          session.set(token_key, token)                  │
//! │                                              │                          │
//! │  (app start) login_with_token ──► GET /user/me  (bearer token attached) │
//! │                                                                         │
//! │  logout ──► session.remove(token_key) ──► toast ──► LoggedOut event     │
//! │             (no request)                                                │
//! │                                                                         │
//! │  register_user ──► POST /user ──► toast + navigate("/login")            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use storefront_client::{ApiRequest, SessionStorage, Transport};
use storefront_core::validation::validate_registration;
use storefront_core::{LoginCredentials, Registration, User, LOGIN_ROUTE};

use crate::error::{StoreError, StoreResult};
use crate::events::{EventBus, StoreEvent};
use crate::lifecycle::{dispatch, Loadable, Operation, Slice};
use crate::navigation::Navigator;
use crate::notification::{Notifier, Toast};

const REGISTERED_MESSAGE: &str = "Registration successful";
const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed.";
const LOGGED_OUT_MESSAGE: &str = "Logged out";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub current_user: Option<User>,
    pub loading: bool,
    pub login_error: Option<String>,
    pub registration_error: Option<String>,

    /// Set after a successful registration.
    pub success: bool,
}

impl Loadable for UserState {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

#[derive(Clone)]
pub struct UserStore {
    state: Slice<UserState>,
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStorage>,
    token_key: String,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    events: EventBus,
}

impl UserStore {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStorage>,
        token_key: impl Into<String>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        events: EventBus,
    ) -> Self {
        UserStore {
            state: Slice::new(UserState::default()),
            transport,
            session,
            token_key: token_key.into(),
            notifier,
            navigator,
            events,
        }
    }

    pub fn snapshot(&self) -> UserState {
        self.state.snapshot()
    }

    /// Returns true if a session token is stored.
    pub fn has_session(&self) -> bool {
        self.session.get(&self.token_key).is_some()
    }

    // =========================================================================
    // Async Operations
    // =========================================================================

    /// Logs in and stores the returned token for later requests.
    pub fn login_with_email(&self, credentials: LoginCredentials) -> Operation<User> {
        let store = self.clone();

        dispatch(
            &self.state,
            "user/loginWithEmail",
            async move { store.post_login(&credentials).await },
            |state, user| {
                state.current_user = Some(user.clone());
                state.login_error = None;
            },
            |state, reason| state.login_error = Some(reason.to_string()),
        )
    }

    /// Creates an account and sends the UI to the login screen.
    pub fn register_user(&self, registration: Registration) -> Operation<()> {
        let store = self.clone();

        let work = async move {
            let result = store.post_registration(&registration).await;
            match &result {
                Ok(()) => {
                    store.notifier.notify(Toast::success(REGISTERED_MESSAGE));
                    store.navigator.navigate(LOGIN_ROUTE);
                }
                Err(_) => store.notifier.notify(Toast::error(REGISTRATION_FAILED_MESSAGE)),
            }
            result
        };

        dispatch(
            &self.state,
            "user/registerUser",
            work,
            |state, _| {
                state.registration_error = None;
                state.success = true;
            },
            |state, reason| state.registration_error = Some(reason.to_string()),
        )
    }

    /// Restores the profile for a token left in the session.
    ///
    /// A rejection only clears `loading`; no error is recorded.
    pub fn login_with_token(&self) -> Operation<User> {
        let store = self.clone();

        dispatch(
            &self.state,
            "user/loginWithToken",
            async move { store.fetch_me().await },
            |state, user| state.current_user = Some(user.clone()),
            |_, _| {},
        )
    }

    /// Ends the session locally. No request is made.
    ///
    /// `login_error` and `registration_error` are left as they are.
    pub fn logout(&self) -> Operation<()> {
        let store = self.clone();

        let work = async move {
            store.session.remove(&store.token_key);
            store.notifier.notify(Toast::success(LOGGED_OUT_MESSAGE));
            store.events.publish(StoreEvent::LoggedOut);
            info!("Logged out");
            Ok::<_, StoreError>(())
        };

        dispatch(
            &self.state,
            "user/logout",
            work,
            |state, _| {
                state.current_user = None;
                state.success = false;
            },
            |_, _| {},
        )
    }

    // =========================================================================
    // Synchronous Actions
    // =========================================================================

    pub fn clear_errors(&self) {
        self.state.update(|state| {
            state.login_error = None;
            state.registration_error = None;
        });
    }

    // =========================================================================
    // Requests
    // =========================================================================

    async fn post_login(&self, credentials: &LoginCredentials) -> StoreResult<User> {
        let request = ApiRequest::post("/auth/login", credentials)?;
        let response = self.transport.send(request).await?.ensure_success()?;
        let token: String = response.field("token")?;
        let user: User = response.field("user")?;

        self.session.set(&self.token_key, &token);
        info!(user_id = %user.id, "Logged in");
        Ok(user)
    }

    async fn post_registration(&self, registration: &Registration) -> StoreResult<()> {
        validate_registration(registration)?;
        let request = ApiRequest::post("/user", registration)?;
        self.transport.send(request).await?.ensure_success()?;
        info!(email = %registration.email, "User registered");
        Ok(())
    }

    async fn fetch_me(&self) -> StoreResult<User> {
        let response = self
            .transport
            .send(ApiRequest::get("/user/me"))
            .await?
            .ensure_success()?;
        Ok(response.field("user")?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use storefront_client::{MemorySessionStorage, Method, MockTransport};
    use tokio::sync::mpsc::UnboundedReceiver;

    use crate::navigation::ChannelNavigator;
    use crate::notification::{ChannelNotifier, ToastLevel};
    use crate::test_support::user_json;

    struct Harness {
        users: UserStore,
        mock: Arc<MockTransport>,
        session: Arc<MemorySessionStorage>,
        toasts: UnboundedReceiver<Toast>,
        routes: UnboundedReceiver<String>,
        events: EventBus,
    }

    fn harness() -> Harness {
        let mock = Arc::new(MockTransport::new());
        let session = Arc::new(MemorySessionStorage::new());
        let (notifier, toasts) = ChannelNotifier::new();
        let (navigator, routes) = ChannelNavigator::new();
        let events = EventBus::new();
        let users = UserStore::new(
            mock.clone(),
            session.clone(),
            "token",
            Arc::new(notifier),
            Arc::new(navigator),
            events.clone(),
        );
        Harness {
            users,
            mock,
            session,
            toasts,
            routes,
            events,
        }
    }

    fn credentials() -> LoginCredentials {
        LoginCredentials {
            email: "ann@example.com".into(),
            password: "secret".into(),
        }
    }

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.into(),
            name: "Ann".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn test_login_stores_token_and_user() {
        let h = harness();
        h.mock.respond(
            Method::Post,
            "/auth/login",
            200,
            json!({ "status": "success", "token": "jwt-123", "user": user_json("u1") }),
        );

        let user = h.users.login_with_email(credentials()).into_result().await.unwrap();
        assert_eq!(user.id, "u1");

        assert_eq!(h.session.get("token").as_deref(), Some("jwt-123"));
        assert!(h.users.has_session());

        let state = h.users.snapshot();
        assert_eq!(state.current_user.map(|u| u.email), Some("u1@example.com".into()));
        assert_eq!(state.login_error, None);
        assert!(!state.loading);

        let body = h.mock.last(Method::Post, "/auth/login").unwrap().body.unwrap();
        assert_eq!(body, json!({ "email": "ann@example.com", "password": "secret" }));
    }

    #[tokio::test]
    async fn test_login_failure_sets_login_error() {
        let h = harness();
        h.mock.respond(Method::Post, "/auth/login", 400, json!({ "message": "invalid email or password" }));

        let err = h.users.login_with_email(credentials()).into_result().await.unwrap_err();
        assert_eq!(err.to_string(), "invalid email or password");

        let state = h.users.snapshot();
        assert_eq!(state.login_error.as_deref(), Some("invalid email or password"));
        assert!(state.current_user.is_none());
        assert!(!h.users.has_session());
    }

    #[tokio::test]
    async fn test_register_toasts_and_navigates() {
        let mut h = harness();
        h.mock.respond(Method::Post, "/user", 200, json!({ "status": "success" }));

        h.users.register_user(registration("ann@example.com")).into_result().await.unwrap();

        let state = h.users.snapshot();
        assert!(state.success);
        assert_eq!(state.registration_error, None);

        let toast = h.toasts.try_recv().unwrap();
        assert_eq!(toast.level, ToastLevel::Success);
        assert_eq!(toast.message, "Registration successful");
        assert_eq!(h.routes.try_recv().unwrap(), "/login");

        let body = h.mock.last(Method::Post, "/user").unwrap().body.unwrap();
        assert_eq!(body["name"], "Ann");
    }

    #[tokio::test]
    async fn test_register_failure_toasts_without_navigating() {
        let mut h = harness();
        h.mock.respond(Method::Post, "/user", 400, json!({ "message": "User already exist" }));

        let err = h.users.register_user(registration("ann@example.com")).into_result().await.unwrap_err();
        assert_eq!(err.to_string(), "User already exist");

        let state = h.users.snapshot();
        assert_eq!(state.registration_error.as_deref(), Some("User already exist"));
        assert!(!state.success);

        let toast = h.toasts.try_recv().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Registration failed.");
        assert!(h.routes.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_register_invalid_email_sends_nothing() {
        let mut h = harness();

        let err = h.users.register_user(registration("not-an-email")).into_result().await.unwrap_err();
        assert!(err.to_string().starts_with("email has invalid format"));
        assert!(h.mock.requests().is_empty());
        assert_eq!(h.toasts.try_recv().unwrap().message, "Registration failed.");
    }

    #[tokio::test]
    async fn test_login_with_token() {
        let h = harness();
        h.session.set("token", "jwt-123");
        h.mock.respond(Method::Get, "/user/me", 200, json!({ "status": "success", "user": user_json("u1") }));

        h.users.login_with_token().into_result().await.unwrap();
        assert!(h.users.snapshot().current_user.is_some());
    }

    #[tokio::test]
    async fn test_login_with_token_rejection_only_clears_loading() {
        let h = harness();
        h.mock.respond(Method::Get, "/user/me", 401, json!({ "message": "invalid token" }));

        let before = h.users.snapshot();
        let err = h.users.login_with_token().into_result().await.unwrap_err();
        assert_eq!(err.to_string(), "invalid token");
        assert_eq!(h.users.snapshot(), before);
    }

    #[tokio::test]
    async fn test_logout_leaves_errors_untouched() {
        let mut h = harness();
        let mut events = h.events.subscribe();
        h.mock.respond(Method::Post, "/auth/login", 401, json!({ "message": "wrong password" }));
        h.users.login_with_email(credentials()).into_result().await.unwrap_err();
        h.session.set("token", "stale");

        h.users.logout().into_result().await.unwrap();

        let state = h.users.snapshot();
        assert!(state.current_user.is_none());
        assert!(!state.success);
        assert!(!state.loading);
        assert_eq!(state.login_error.as_deref(), Some("wrong password"));

        assert_eq!(h.session.get("token"), None);
        assert_eq!(h.toasts.try_recv().unwrap().message, "Logged out");
        assert_eq!(events.try_recv().unwrap(), StoreEvent::LoggedOut);
        assert_eq!(h.mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_errors() {
        let h = harness();
        h.mock.respond(Method::Post, "/auth/login", 401, json!({ "message": "wrong password" }));
        h.users.login_with_email(credentials()).into_result().await.unwrap_err();

        h.users.clear_errors();
        let state = h.users.snapshot();
        assert_eq!(state.login_error, None);
        assert_eq!(state.registration_error, None);
    }
}
