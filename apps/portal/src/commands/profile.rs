use studyhub_shared::api::user::{ProfilePatch, UserProfile};
use studyhub_shared::error::PortalError;

use crate::error::AppError;
use crate::Portal;

pub fn profile_get(portal: &Portal) -> Result<UserProfile, AppError> {
    portal
        .session()
        .current_user()
        .ok_or_else(|| PortalError::Unauthorized.into())
}

/// Save edits from the profile view. Empty patches are a no-op.
pub fn profile_update(portal: &Portal, patch: ProfilePatch) -> Result<UserProfile, AppError> {
    if patch.is_empty() {
        return profile_get(portal);
    }
    Ok(portal.session().update_profile(patch)?)
}

pub fn profile_replace(portal: &Portal, profile: UserProfile) -> Result<UserProfile, AppError> {
    Ok(portal.session().update_profile(profile)?)
}
