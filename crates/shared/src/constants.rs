/// Name of the durable slot holding the serialized session profile.
pub const SESSION_COOKIE_NAME: &str = "user";
/// Lifetime of the durable session slot: 7 days.
pub const SESSION_MAX_AGE_DAYS: i64 = 7;
/// Cookie path scope: the whole application.
pub const SESSION_COOKIE_PATH: &str = "/";

/// Display name used when a profile carries no name fields.
pub const FALLBACK_DISPLAY_NAME: &str = "User";
/// Avatar initial used when a profile carries no name fields.
pub const FALLBACK_INITIAL: char = 'U';
/// Avatar shown when a profile has no `avatarUrl`.
pub const DEFAULT_AVATAR_URL: &str = "https://mui.com/static/images/avatar/1.jpg";

/// Default OpenAI-compatible completion endpoint.
pub const DEFAULT_CHAT_API_URL: &str = "https://api.groq.com/openai/v1";
/// Default completion model.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
/// Assistant-authored entry appended when a chat request fails.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error while processing your request.";
