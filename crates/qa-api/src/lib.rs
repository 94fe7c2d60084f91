//! Q&A resources of the mini-overflow API
//!
//! Questions, answers, comments, votes, tags and user profiles as typed
//! operations on top of `api_client::ApiClient`.

pub mod client;
pub mod describe;
pub mod models;

pub use client::QaClient;
pub use describe::{SESSION_EXPIRED, describe};
pub use models::{
    Answer, Comment, NewQuestion, Profile, Question, QuestionFilter, QuestionSummary, Sort, Tag,
    User, Vote, VoteOutcome, VoteTarget,
};
