use studyhub_session::{guard, GuardDecision, Route, SessionStatus};
use studyhub_shared::api::auth::RegisterRequest;
use studyhub_shared::api::user::{Role, UserProfile};

use crate::error::AppError;
use crate::Portal;

/// Sign in against the auth service. A rejection leaves the session untouched.
pub async fn auth_login(
    portal: &Portal,
    email: String,
    password: String,
) -> Result<UserProfile, AppError> {
    let user = portal.auth().login(email, password).await?;
    portal.session().login(user.clone())?;
    Ok(user)
}

/// Create an account and sign straight into it.
pub async fn auth_register(
    portal: &Portal,
    request: RegisterRequest,
) -> Result<UserProfile, AppError> {
    let user = portal.auth().register(request).await?;
    portal.session().login(user.clone())?;
    Ok(user)
}

pub fn auth_logout(portal: &Portal) -> Result<(), AppError> {
    portal.session().logout();
    Ok(())
}

pub fn session_status(portal: &Portal) -> Result<SessionStatus, AppError> {
    Ok(portal.session().status())
}

/// What the view layer should do when `path` is requested.
///
/// Public routes always render; protected ones go through the guard.
pub fn route_access(
    portal: &Portal,
    path: &str,
    required_role: Option<Role>,
) -> Result<GuardDecision, AppError> {
    let route = Route::from_path(path);
    if !route.requires_auth() {
        return Ok(GuardDecision::Render);
    }
    Ok(guard(&portal.session().status(), required_role))
}
