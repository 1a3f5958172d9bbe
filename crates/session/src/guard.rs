use studyhub_shared::api::user::Role;

use crate::route::Route;
use crate::status::SessionStatus;

/// What a guarded view should do for the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not established yet: show a placeholder, decide nothing.
    ShowLoading,
    Redirect(Route),
    Render,
}

/// Pure allow/deny decision for a guarded view.
///
/// - loading → placeholder
/// - unauthenticated → `/login`
/// - role mismatch → `/dashboard`
/// - otherwise render
pub fn guard(status: &SessionStatus, required_role: Option<Role>) -> GuardDecision {
    match status {
        SessionStatus::Loading => GuardDecision::ShowLoading,
        SessionStatus::Unauthenticated => GuardDecision::Redirect(Route::Login),
        SessionStatus::Authenticated(user) => match required_role {
            Some(role) if user.role != role => GuardDecision::Redirect(Route::Dashboard),
            _ => GuardDecision::Render,
        },
    }
}
