use crate::chat::ChatEntry;
use crate::error::AppError;
use crate::Portal;

/// Send one message and return the updated history. Assistant failures
/// show up as an entry, never as an error.
pub async fn chat_send(portal: &Portal, message: String) -> Result<Vec<ChatEntry>, AppError> {
    portal.chat().send(&message).await;
    Ok(portal.chat().entries())
}

pub fn chat_history(portal: &Portal) -> Result<Vec<ChatEntry>, AppError> {
    Ok(portal.chat().entries())
}

pub fn chat_clear(portal: &Portal) -> Result<(), AppError> {
    portal.chat().clear();
    Ok(())
}
