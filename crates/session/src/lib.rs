//! studyhub-session — client-side session state for the StudyHub portal.
//!
//! Holds the signed-in user's profile, replicates it into a durable slot
//! (cookie, SQLite row, or OS keychain entry) so a reload does not force a
//! new login, and broadcasts every change to subscribed views. The route
//! guard turns the resulting tri-state status into allow/deny decisions.

pub mod error;
pub mod guard;
pub mod navigator;
pub mod route;
pub mod status;
pub mod storage;
pub mod store;

pub use error::SessionError;
pub use guard::{guard, GuardDecision};
pub use navigator::{HistoryNavigator, Navigator};
pub use route::Route;
pub use status::SessionStatus;
pub use store::SessionStore;
