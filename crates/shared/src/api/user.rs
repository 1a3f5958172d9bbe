use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{DEFAULT_AVATAR_URL, FALLBACK_DISPLAY_NAME, FALLBACK_INITIAL};
use crate::ids::UserId;

pub const ATTR_DEPARTMENT: &str = "department";
pub const ATTR_AVATAR_URL: &str = "avatarUrl";
pub const ATTR_PHONE_NUMBER: &str = "phoneNumber";
pub const ATTR_EMAIL: &str = "email";

/// Keys owned by typed `UserProfile` fields (including aliases). An
/// attribute under one of these would be read back as the typed field.
pub const RESERVED_KEYS: [&str; 7] = [
    "identity",
    "id",
    "displayName",
    "name",
    "firstName",
    "lastName",
    "role",
];

pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Portal role. Only used to branch UI; never enforced server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "Student")]
    Student,
    #[serde(alias = "Lecturer")]
    Lecturer,
    #[serde(alias = "Admin")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Lecturer => "lecturer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "lecturer" => Ok(Self::Lecturer),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Locally cached profile of the signed-in user.
///
/// The auth service is inconsistent about names: it sends either
/// `firstName`/`lastName` or a single `name`/`displayName`. Both shapes are
/// accepted and the accessors below pick whichever is present. Every other
/// key lands in `attributes` and survives a round-trip untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "id")]
    pub identity: UserId,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub role: Role,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl UserProfile {
    pub fn new(identity: impl Into<UserId>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            display_name: None,
            first_name: None,
            last_name: None,
            role,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_names(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = Some(first.into());
        self.last_name = Some(last.into());
        self
    }

    /// Reserved keys (see [`RESERVED_KEYS`]) are ignored.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !is_reserved_key(&key) {
            self.attributes.insert(key, value.into());
        }
        self
    }

    /// Drop attributes that collide with typed fields, so the serialized
    /// form deserializes back to an identical profile.
    pub fn without_reserved_attributes(mut self) -> Self {
        self.attributes.retain(|key, _| !is_reserved_key(key));
        self
    }

    /// Full name for headers and greetings.
    pub fn display_name(&self) -> String {
        if let Some(name) = non_empty(&self.display_name) {
            return name.to_string();
        }
        let joined = [non_empty(&self.first_name), non_empty(&self.last_name)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            FALLBACK_DISPLAY_NAME.to_string()
        } else {
            joined
        }
    }

    pub fn first_name(&self) -> String {
        non_empty(&self.first_name)
            .or_else(|| non_empty(&self.display_name).and_then(|n| n.split_whitespace().next()))
            .unwrap_or(FALLBACK_DISPLAY_NAME)
            .to_string()
    }

    pub fn last_name(&self) -> String {
        non_empty(&self.last_name)
            .or_else(|| non_empty(&self.display_name).and_then(|n| n.split_whitespace().nth(1)))
            .unwrap_or_default()
            .to_string()
    }

    /// Avatar letter: first character of the first name, else of the display name.
    pub fn initial(&self) -> char {
        non_empty(&self.first_name)
            .or_else(|| non_empty(&self.display_name))
            .and_then(|n| n.chars().next())
            .unwrap_or(FALLBACK_INITIAL)
    }

    /// String attribute lookup. Non-string values read as absent.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn department(&self) -> Option<&str> {
        self.attribute(ATTR_DEPARTMENT)
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.attribute(ATTR_AVATAR_URL)
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.attribute(ATTR_PHONE_NUMBER)
    }

    pub fn email(&self) -> Option<&str> {
        self.attribute(ATTR_EMAIL)
    }

    pub fn department_label(&self) -> &str {
        self.department().unwrap_or_default()
    }

    pub fn avatar_or_default(&self) -> &str {
        self.avatar_url().unwrap_or(DEFAULT_AVATAR_URL)
    }
}

/// Edited profile fields. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite every field present in the patch. Identity and role are never touched.
    pub fn apply(&self, profile: &mut UserProfile) {
        if let Some(v) = &self.display_name {
            profile.display_name = Some(v.clone());
        }
        if let Some(v) = &self.first_name {
            profile.first_name = Some(v.clone());
        }
        if let Some(v) = &self.last_name {
            profile.last_name = Some(v.clone());
        }
        let attrs = [
            (ATTR_EMAIL, &self.email),
            (ATTR_PHONE_NUMBER, &self.phone_number),
            (ATTR_DEPARTMENT, &self.department),
            (ATTR_AVATAR_URL, &self.avatar_url),
        ];
        for (key, value) in attrs {
            if let Some(v) = value {
                profile
                    .attributes
                    .insert(key.to_string(), Value::String(v.clone()));
            }
        }
    }
}

/// A profile-edit save: wholesale replacement or a field patch.
#[derive(Debug, Clone, PartialEq)]
pub enum ProfileUpdate {
    Replace(UserProfile),
    Patch(ProfilePatch),
}

impl From<UserProfile> for ProfileUpdate {
    fn from(profile: UserProfile) -> Self {
        Self::Replace(profile)
    }
}

impl From<ProfilePatch> for ProfileUpdate {
    fn from(patch: ProfilePatch) -> Self {
        Self::Patch(patch)
    }
}
