pub mod auth;
pub mod chat;
pub mod forum;
pub mod profile;
