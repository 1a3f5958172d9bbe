use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOPIC: &str = "General";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub author: String,
    pub posted_at: DateTime<Utc>,
    pub votes: u32,
    pub replies: u32,
    pub views: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscussionFilter {
    #[default]
    Latest,
    Popular,
    Unanswered,
}

/// URL slug for a topic name: lowercase, whitespace runs become `-`.
pub fn topic_slug(topic: &str) -> String {
    topic
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// In-memory discussion list backing the forum views.
#[derive(Debug, Default)]
pub struct DiscussionBoard {
    discussions: Vec<Discussion>,
}

impl DiscussionBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_discussions(discussions: Vec<Discussion>) -> Self {
        Self { discussions }
    }

    pub fn get(&self, id: u64) -> Option<&Discussion> {
        self.discussions.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.discussions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discussions.is_empty()
    }

    fn get_mut(&mut self, id: u64) -> Option<&mut Discussion> {
        self.discussions.iter_mut().find(|d| d.id == id)
    }

    pub fn upvote(&mut self, id: u64) -> Option<u32> {
        let discussion = self.get_mut(id)?;
        discussion.votes = discussion.votes.saturating_add(1);
        Some(discussion.votes)
    }

    /// Votes never go below zero.
    pub fn downvote(&mut self, id: u64) -> Option<u32> {
        let discussion = self.get_mut(id)?;
        discussion.votes = discussion.votes.saturating_sub(1);
        Some(discussion.votes)
    }

    /// Prepend a new discussion. Blank content is ignored.
    pub fn post(
        &mut self,
        author: impl Into<String>,
        content: &str,
        topic: Option<&str>,
    ) -> Option<&Discussion> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let id = self.discussions.iter().map(|d| d.id).max().unwrap_or(0) + 1;
        let topic = topic
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TOPIC);
        self.discussions.insert(
            0,
            Discussion {
                id,
                topic: Some(topic.to_string()),
                title: None,
                content: content.to_string(),
                author: author.into(),
                posted_at: Utc::now(),
                votes: 0,
                replies: 0,
                views: 0,
            },
        );
        self.discussions.first()
    }

    pub fn delete(&mut self, id: u64) -> Option<Discussion> {
        let idx = self.discussions.iter().position(|d| d.id == id)?;
        Some(self.discussions.remove(idx))
    }

    pub fn list(&self, filter: DiscussionFilter) -> Vec<Discussion> {
        let mut out: Vec<Discussion> = match filter {
            DiscussionFilter::Unanswered => self
                .discussions
                .iter()
                .filter(|d| d.replies == 0)
                .cloned()
                .collect(),
            _ => self.discussions.clone(),
        };
        match filter {
            DiscussionFilter::Popular => out.sort_by(|a, b| {
                b.votes
                    .cmp(&a.votes)
                    .then_with(|| b.posted_at.cmp(&a.posted_at))
            }),
            _ => out.sort_by(|a, b| b.posted_at.cmp(&a.posted_at)),
        }
        out
    }

    /// Discussions whose topic slugs to `slug`, newest first.
    pub fn by_topic(&self, slug: &str) -> Vec<Discussion> {
        let mut out: Vec<Discussion> = self
            .discussions
            .iter()
            .filter(|d| d.topic.as_deref().is_some_and(|t| topic_slug(t) == slug))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.posted_at.cmp(&a.posted_at));
        out
    }
}
