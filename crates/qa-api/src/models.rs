//! Resource shapes returned and accepted by the Q&A backend

use serde::{Deserialize, Serialize};

/// Public user record, nested as `author` in questions, answers and comments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub reputation: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub questions_count: u64,
    #[serde(default)]
    pub answers_count: u64,
}

/// The logged-in user's own profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub total_votes: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions_count: u64,
}

/// Row of the question listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestionSummary {
    pub id: u64,
    pub title: String,
    pub author: User,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub answer_count: u64,
    #[serde(default)]
    pub has_accepted_answer: bool,
    #[serde(default)]
    pub views: u64,
    pub created_at: String,
}

/// Question detail, answers and comments included.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Question {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub author: User,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub answer_count: u64,
    #[serde(default)]
    pub answers: Vec<Answer>,
    /// `1`, `-1`, or `None` when the caller has not voted (or is anonymous)
    #[serde(default)]
    pub user_vote: Option<i8>,
    #[serde(default)]
    pub views: u64,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Question {
    pub fn accepted_answer(&self) -> Option<&Answer> {
        self.answers.iter().find(|a| a.is_accepted)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    pub id: u64,
    /// Id of the question this answers
    pub question: u64,
    pub author: User,
    pub content: String,
    #[serde(default)]
    pub is_accepted: bool,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub user_vote: Option<i8>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author: User,
    pub content: String,
    pub created_at: String,
}

/// Body of a vote response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VoteOutcome {
    pub vote_count: i64,
    pub user_vote: i8,
}

/// Question creation/edit payload. Tags are referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub tag_ids: Vec<u64>,
}

impl NewQuestion {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tag_ids: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tag_ids: impl IntoIterator<Item = u64>) -> Self {
        self.tag_ids = tag_ids.into_iter().collect();
        self
    }
}

/// Up or down vote; serialized as `1` / `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

impl Vote {
    pub fn value(self) -> i8 {
        match self {
            Vote::Up => 1,
            Vote::Down => -1,
        }
    }
}

/// What a vote applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTarget {
    Question(u64),
    Answer(u64),
}

impl VoteTarget {
    pub(crate) fn path(self) -> String {
        match self {
            VoteTarget::Question(id) => format!("/questions/{id}/vote/"),
            VoteTarget::Answer(id) => format!("/answers/{id}/vote/"),
        }
    }
}

/// Ordering of the question listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Newest first
    #[default]
    Recent,
    Votes,
}

/// Filters for `QaClient::list_questions`. Unset fields are not sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionFilter {
    pub tag: Option<String>,
    pub unanswered: bool,
    pub sort: Sort,
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl QuestionFilter {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.trim().is_empty()) {
            pairs.push(("tag", tag.to_owned()));
        }
        if self.unanswered {
            pairs.push(("unanswered", "true".to_owned()));
        }
        if self.sort == Sort::Votes {
            pairs.push(("sort", "votes".to_owned()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            pairs.push(("search", search.to_owned()));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }
}
