// Session context
// The single owner of "who is logged in": restores the persisted session at
// startup, runs login/register/logout and keeps the HTTP client's token, the
// token store and the in-memory state in step.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tokio::task;
use tracing::{debug, error, info, warn};

use crate::api::AuthApi;
use crate::auth::error::{failure_message, SessionAction, SessionError};
use crate::auth::models::{
    redirect_path_for, AuthPayload, LoginRequest, RegisterRequest, Role, Session,
    UpdateProfileRequest,
};
use crate::auth::notifier::{Notification, Notifier, TracingNotifier};
use crate::error::ApiError;
use crate::http::HttpClient;
use crate::store::{LoadResult, TokenStore};

// The current state plus a counter bumped whenever a session ends or a new
// one is signed in. Work that started under an older epoch is discarded.
#[derive(Debug, Default)]
struct Slot {
    state: SessionState,
    epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Uninitialized,
    Initializing,
    Authenticated(Session),
    Unauthenticated,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Unauthenticated => "unauthenticated",
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    /// True until the startup check has finished
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            SessionState::Uninitialized | SessionState::Initializing
        )
    }
}

/// Result of a successful login or registration
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub session: Session,
    /// Where the caller should navigate next
    pub redirect_to: &'static str,
}

pub struct SessionContext {
    client: HttpClient,
    auth: AuthApi,
    store: TokenStore,
    notifier: Arc<dyn Notifier>,
    slot: RwLock<Slot>,
    // Held for the whole of initialize/login/register
    in_flight: Mutex<()>,
}

impl SessionContext {
    pub fn new(client: HttpClient, store: TokenStore) -> Self {
        Self::with_notifier(client, store, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(client: HttpClient, store: TokenStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            client,
            store,
            notifier,
            slot: RwLock::new(Slot::default()),
            in_flight: Mutex::new(()),
        }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub async fn state(&self) -> SessionState {
        self.slot.read().await.state.clone()
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.slot.read().await.state.session().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.slot.read().await.state.is_authenticated()
    }

    pub async fn current_role(&self) -> Option<Role> {
        self.slot.read().await.state.session().map(Session::role)
    }

    pub async fn has_role(&self, role: Role) -> bool {
        self.current_role().await == Some(role)
    }

    /// Landing path for the signed-in user, if any
    pub async fn redirect_path(&self) -> Option<&'static str> {
        self.current_role().await.map(redirect_path_for)
    }

    /// Restore and verify the persisted session
    ///
    /// Never fails: anything short of a verified session ends unauthenticated.
    pub async fn initialize(&self) -> SessionState {
        let _guard = self.in_flight.lock().await;
        let epoch = {
            let mut slot = self.slot.write().await;
            transition(&mut slot, SessionState::Initializing);
            slot.epoch
        };

        let stored = match self.load_stored().await {
            LoadResult::Loaded(session) => session,
            LoadResult::Empty => {
                debug!("No stored session");
                return self.end(Some(epoch)).await;
            }
            LoadResult::Corrupt(reason) => {
                warn!("Discarding unreadable stored session: {}", reason);
                return self.end(Some(epoch)).await;
            }
        };

        {
            // A logout may already have run; do not hand its token back
            let slot = self.slot.read().await;
            if slot.epoch != epoch {
                return slot.state.clone();
            }
            self.client.set_token(stored.token.clone()).await;
        }

        match self.auth.me().await {
            Ok(user) => {
                let session = stored.with_user(user);
                if self.commit(epoch, &session, false).await {
                    info!(
                        "Restored session for {} ({})",
                        session.display_name(),
                        session.role()
                    );
                }
                self.state().await
            }
            Err(err) => {
                warn!(
                    "Stored session could not be verified ({}): {}",
                    err.category(),
                    err.message
                );
                self.end(Some(epoch)).await
            }
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        let (_guard, epoch) = self.begin_sign_in(SessionAction::Login).await?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let result = self.auth.login(&request).await;
        self.complete_sign_in(SessionAction::Login, epoch, result).await
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<LoginOutcome, SessionError> {
        let (_guard, epoch) = self.begin_sign_in(SessionAction::Register).await?;

        let request = RegisterRequest {
            email: request.email.trim().to_string(),
            ..request
        };
        let result = self.auth.register(&request).await;
        self.complete_sign_in(SessionAction::Register, epoch, result).await
    }

    /// Update the signed-in user's profile
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<Session, SessionError> {
        let (current, epoch) = self.signed_in().await?;

        match self.auth.update_profile(request).await {
            Ok(user) => {
                let session = current.with_user(user);
                if !self.commit(epoch, &session, false).await {
                    return Err(SessionError::SessionEnded);
                }
                self.notifier
                    .notify(Notification::success("Profile updated successfully"));
                Ok(session)
            }
            Err(err) => Err(self.fail(SessionAction::UpdateProfile, epoch, err).await),
        }
    }

    /// Re-fetch the profile behind the current token
    ///
    /// Only a 401 ends the session; other failures leave it in place.
    pub async fn refresh_profile(&self) -> Result<Session, SessionError> {
        let (current, epoch) = self.signed_in().await?;

        match self.auth.me().await {
            Ok(user) => {
                let session = current.with_user(user);
                if !self.commit(epoch, &session, false).await {
                    return Err(SessionError::SessionEnded);
                }
                Ok(session)
            }
            Err(err) => Err(self.fail(SessionAction::RefreshProfile, epoch, err).await),
        }
    }

    /// Sign out locally, telling the server if possible
    ///
    /// Requests still in flight for the old session are discarded when they
    /// complete.
    pub async fn logout(&self) {
        if self.client.token().await.is_some() {
            if let Err(err) = self.auth.logout().await {
                warn!("Server logout failed, clearing local session anyway: {}", err);
            }
        }

        self.end(None).await;
        info!("Logged out");
        self.notifier
            .notify(Notification::info("You have been logged out"));
    }

    async fn begin_sign_in(
        &self,
        action: SessionAction,
    ) -> Result<(MutexGuard<'_, ()>, u64), SessionError> {
        let guard = self.in_flight.try_lock().map_err(|_| {
            warn!("Rejected {} while another session operation is running", action.as_str());
            SessionError::OperationInProgress
        })?;
        let epoch = self.slot.read().await.epoch;
        Ok((guard, epoch))
    }

    async fn complete_sign_in(
        &self,
        action: SessionAction,
        epoch: u64,
        result: Result<AuthPayload, ApiError>,
    ) -> Result<LoginOutcome, SessionError> {
        let payload = match result {
            Ok(payload) => payload,
            Err(err) => return Err(self.fail(action, epoch, err).await),
        };

        let session = Session::new(payload.user, payload.token);
        if !self.commit(epoch, &session, true).await {
            warn!("Dropped {} result: signed out while it was running", action.as_str());
            return Err(SessionError::SessionEnded);
        }

        info!(
            "Signed in as {} ({}) via {}",
            session.display_name(),
            session.role(),
            action.as_str()
        );
        let message = match action {
            SessionAction::Register => {
                format!("Welcome, {}! Your account has been created.", session.display_name())
            }
            _ => format!("Welcome back, {}!", session.display_name()),
        };
        self.notifier.notify(Notification::success(message));

        Ok(LoginOutcome {
            redirect_to: redirect_path_for(session.role()),
            session,
        })
    }

    /// Report a failed action; an expired token also ends the session
    async fn fail(&self, action: SessionAction, epoch: u64, err: ApiError) -> SessionError {
        warn!(
            "{} failed ({}): {}",
            action.as_str(),
            err.category(),
            err.message
        );
        self.notifier
            .notify(Notification::error(failure_message(action, &err)));

        let signed_in = matches!(
            action,
            SessionAction::UpdateProfile | SessionAction::RefreshProfile
        );
        if signed_in && err.is_unauthorized() {
            self.end(Some(epoch)).await;
        }
        SessionError::Api(err)
    }

    async fn signed_in(&self) -> Result<(Session, u64), SessionError> {
        let slot = self.slot.read().await;
        match slot.state.session() {
            Some(session) => Ok((session.clone(), slot.epoch)),
            None => Err(SessionError::NotAuthenticated),
        }
    }

    /// Install `session` unless the session ended since `epoch` was read
    ///
    /// `replaces` marks a fresh sign-in, which supersedes work still running
    /// for the previous session.
    async fn commit(&self, epoch: u64, session: &Session, replaces: bool) -> bool {
        let mut slot = self.slot.write().await;
        if slot.epoch != epoch {
            debug!("Session epoch moved from {} to {}, discarding update", epoch, slot.epoch);
            return false;
        }
        if replaces {
            slot.epoch += 1;
        }

        self.client.set_token(session.token.clone()).await;
        self.persist(session).await;
        transition(&mut slot, SessionState::Authenticated(session.clone()));
        true
    }

    /// End the session, or only the one started at `epoch` when given
    async fn end(&self, epoch: Option<u64>) -> SessionState {
        let mut slot = self.slot.write().await;
        if epoch.map_or(false, |epoch| epoch != slot.epoch) {
            return slot.state.clone();
        }
        slot.epoch += 1;

        self.client.clear_token().await;
        self.clear_stored().await;
        transition(&mut slot, SessionState::Unauthenticated)
    }

    // Storage backends do blocking I/O, so they run on the blocking pool

    async fn load_stored(&self) -> LoadResult {
        let store = self.store.clone();
        match task::spawn_blocking(move || store.load()).await {
            Ok(result) => result,
            Err(err) => LoadResult::Corrupt(format!("storage task failed: {}", err)),
        }
    }

    async fn persist(&self, session: &Session) {
        // The in-memory session stays usable even if it cannot be saved
        let store = self.store.clone();
        let session = session.clone();
        match task::spawn_blocking(move || store.save(&session)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("Failed to persist session: {}", err),
            Err(err) => error!("Session persistence task failed: {}", err),
        }
    }

    async fn clear_stored(&self) {
        let store = self.store.clone();
        match task::spawn_blocking(move || store.clear()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => error!("Failed to clear stored session: {}", err),
            Err(err) => error!("Session clearing task failed: {}", err),
        }
    }
}

fn transition(slot: &mut Slot, next: SessionState) -> SessionState {
    if slot.state.as_str() != next.as_str() {
        debug!("Session state {} -> {}", slot.state.as_str(), next.as_str());
    }
    slot.state = next.clone();
    next
}
