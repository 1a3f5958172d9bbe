use serde::Serialize;
use studyhub_shared::api::user::UserProfile;

/// Tri-state session status observed by views and route guards.
///
/// `Loading` only exists between construction and `initialize()`; it must
/// never be read as "logged out".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "lowercase")]
pub enum SessionStatus {
    Loading,
    Authenticated(UserProfile),
    Unauthenticated,
}

impl SessionStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhub_shared::api::user::Role;

    #[test]
    fn loading_is_neither_authenticated_nor_logged_out() {
        let status = SessionStatus::Loading;
        assert!(status.is_loading());
        assert!(!status.is_authenticated());
        assert!(status.user().is_none());
        assert_ne!(status, SessionStatus::Unauthenticated);
    }

    #[test]
    fn authenticated_exposes_user() {
        let status = SessionStatus::Authenticated(UserProfile::new("u1", Role::Student));
        assert!(status.is_authenticated());
        assert_eq!(status.user().unwrap().identity.to_string(), "u1");
        assert_eq!(status.label(), "authenticated");
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(SessionStatus::Unauthenticated).unwrap();
        assert_eq!(json["status"], "unauthenticated");

        let status = SessionStatus::Authenticated(
            UserProfile::new("u1", Role::Admin).with_display_name("Jane"),
        );
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["status"], "authenticated");
        assert_eq!(json["user"]["displayName"], "Jane");
    }
}
