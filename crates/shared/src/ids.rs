use serde::{Deserialize, Serialize};

/// Opaque user identifier assigned by the authentication service.
///
/// The upstream producer sends either a JSON string or a JSON number; both
/// are kept as received so the value serializes back unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Text(String),
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for UserId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_id_deserializes_as_text() {
        let id: UserId = serde_json::from_str(r#""u1""#).unwrap();
        assert_eq!(id, UserId::Text("u1".into()));
    }

    #[test]
    fn numeric_id_deserializes_as_numeric() {
        let id: UserId = serde_json::from_str("123").unwrap();
        assert_eq!(id, UserId::Numeric(123));
    }

    #[test]
    fn numeric_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::from(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn text_and_numeric_with_same_digits_differ() {
        assert_ne!(UserId::from("7"), UserId::from(7));
    }

    #[test]
    fn display_has_no_quotes() {
        assert_eq!(UserId::from("abc").to_string(), "abc");
        assert_eq!(UserId::from(9).to_string(), "9");
    }

    #[test]
    fn boolean_is_rejected() {
        assert!(serde_json::from_str::<UserId>("true").is_err());
    }
}
