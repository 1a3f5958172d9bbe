//! StudyHub shared library — profile model, IDs, and API contracts shared by the session core and the portal.

pub mod api;
pub mod constants;
pub mod error;
pub mod ids;
