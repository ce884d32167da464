// Authentication module
// Session models, JWT claim inspection and the session context that owns the
// logged-in state

pub mod error;
pub mod models;
pub mod notifier;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use error::{failure_message, SessionAction, SessionError};
pub use models::{
    redirect_path_for, AuthPayload, ChangePasswordRequest, LoginRequest, RegisterRequest, Role,
    Session, UpdateProfileRequest, User,
};
pub use notifier::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use session::{LoginOutcome, SessionContext, SessionState};
