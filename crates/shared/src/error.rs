/// Shared error type used across the session core and the portal.
///
/// Display strings are shown to the user as-is.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("please log in to continue")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    /// Transport failure; the message is already user-readable.
    #[error("{0}")]
    Network(String),

    /// A collaborator (auth service, chat service) rejected the request.
    #[error("{0}")]
    Upstream(String),

    /// Carries the storage layer's own message.
    #[error("{0}")]
    Storage(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_display() {
        assert_eq!(
            PortalError::Unauthorized.to_string(),
            "please log in to continue"
        );
    }

    #[test]
    fn validation_contains_message() {
        let err = PortalError::Validation("bad input".into());
        assert_eq!(err.to_string(), "validation error: bad input");
    }

    #[test]
    fn upstream_is_verbatim() {
        let err = PortalError::Upstream("Invalid email or password".into());
        assert_eq!(err.to_string(), "Invalid email or password");
    }

    #[test]
    fn not_found_names_the_thing() {
        let err = PortalError::NotFound("discussion 7".into());
        assert_eq!(err.to_string(), "discussion 7 not found");
    }

    #[test]
    fn all_variants_impl_error() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(PortalError::Unauthorized),
            Box::new(PortalError::NotFound("z".into())),
            Box::new(PortalError::Validation("x".into())),
            Box::new(PortalError::Network("n".into())),
            Box::new(PortalError::Upstream("u".into())),
            Box::new(PortalError::Storage("s".into())),
            Box::new(PortalError::Internal("y".into())),
        ];
        for e in &errors {
            let _ = e.to_string();
        }
    }
}
