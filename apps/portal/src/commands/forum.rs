use studyhub_shared::error::PortalError;

use crate::error::AppError;
use crate::forum::{Discussion, DiscussionFilter};
use crate::Portal;

fn not_found(id: u64) -> AppError {
    PortalError::NotFound(format!("discussion {id}")).into()
}

/// Post as the signed-in user.
pub fn forum_post(
    portal: &Portal,
    content: String,
    topic: Option<String>,
) -> Result<Option<Discussion>, AppError> {
    let user = portal
        .session()
        .current_user()
        .ok_or(PortalError::Unauthorized)?;
    let mut board = portal.forum();
    let posted = board
        .post(user.display_name(), &content, topic.as_deref())
        .cloned();
    Ok(posted)
}

pub fn forum_upvote(portal: &Portal, id: u64) -> Result<u32, AppError> {
    portal
        .forum()
        .upvote(id)
        .ok_or_else(|| not_found(id))
}

pub fn forum_downvote(portal: &Portal, id: u64) -> Result<u32, AppError> {
    portal
        .forum()
        .downvote(id)
        .ok_or_else(|| not_found(id))
}

pub fn forum_delete(portal: &Portal, id: u64) -> Result<Discussion, AppError> {
    portal
        .forum()
        .delete(id)
        .ok_or_else(|| not_found(id))
}

pub fn forum_list(portal: &Portal, filter: DiscussionFilter) -> Result<Vec<Discussion>, AppError> {
    Ok(portal.forum().list(filter))
}

pub fn forum_by_topic(portal: &Portal, slug: &str) -> Result<Vec<Discussion>, AppError> {
    Ok(portal.forum().by_topic(slug))
}
