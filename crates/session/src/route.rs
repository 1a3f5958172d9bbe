/// Portal views reachable by path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Landing,
    Home,
    Login,
    Register,
    Dashboard,
    Profile,
    Resources,
    ResourceCategory(String),
    Forum,
    Discussion(u64),
    Topics,
    Topic(String),
    Announcements,
    Chat,
    NotFound(String),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Home => "/home".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::Resources => "/resources".to_string(),
            Self::ResourceCategory(category) => format!("/resources/category/{category}"),
            Self::Forum => "/discussion-forum".to_string(),
            Self::Discussion(id) => format!("/discussion/{id}"),
            Self::Topics => "/topics".to_string(),
            Self::Topic(slug) => format!("/topics/{slug}"),
            Self::Announcements => "/announcements".to_string(),
            Self::Chat => "/ai".to_string(),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Resolve a path. Query strings, fragments and trailing slashes are ignored.
    pub fn from_path(path: &str) -> Self {
        let trimmed = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Landing,
            ["home"] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["profile"] => Self::Profile,
            ["resources"] => Self::Resources,
            ["resources", "category", category] => Self::ResourceCategory(category.to_string()),
            ["discussion-forum"] => Self::Forum,
            ["discussion", id] => match id.parse() {
                Ok(id) => Self::Discussion(id),
                Err(_) => Self::NotFound(path.to_string()),
            },
            ["topics"] => Self::Topics,
            ["topics", slug] => Self::Topic(slug.to_string()),
            ["announcements"] => Self::Announcements,
            ["ai"] => Self::Chat,
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// Views wrapped in the route guard.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Self::Dashboard
                | Self::Profile
                | Self::Resources
                | Self::ResourceCategory(_)
                | Self::Forum
                | Self::Discussion(_)
                | Self::Topics
                | Self::Topic(_)
                | Self::Announcements
                | Self::Chat
        )
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
