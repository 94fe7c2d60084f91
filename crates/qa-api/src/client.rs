//! Typed operations over the Q&A resources
//!
//! Each method is exactly one `ApiClient` call, so the refresh-and-retry
//! behavior applies uniformly. Required text fields are checked locally
//! before anything goes on the wire.

use api_client::{ApiClient, Listing, PendingRequest, Result, require};
use serde_json::json;
use tracing::{debug, instrument};

use crate::models::{
    Answer, Comment, NewQuestion, Profile, Question, QuestionFilter, QuestionSummary, Tag, User,
    Vote, VoteOutcome, VoteTarget,
};

/// Q&A resource client.
#[derive(Clone)]
pub struct QaClient {
    api: ApiClient,
}

impl QaClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying authenticated client (login, logout, raw requests).
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[instrument(skip_all)]
    pub async fn list_questions(&self, filter: &QuestionFilter) -> Result<Listing<QuestionSummary>> {
        let mut request = PendingRequest::get("/questions/");
        for (key, value) in filter.query_pairs() {
            request = request.query(key, value);
        }
        let listing: Listing<QuestionSummary> = self.api.send(&request).await?.listing()?;
        debug!(count = listing.items.len(), has_more = listing.has_more(), "questions listed");
        Ok(listing)
    }

    pub async fn get_question(&self, id: u64) -> Result<Question> {
        self.api.get(&format!("/questions/{id}/")).await?.json()
    }

    #[instrument(skip_all)]
    pub async fn ask(&self, question: &NewQuestion) -> Result<Question> {
        check_question(question)?;
        let request = PendingRequest::post("/questions/").json(question)?;
        self.api.send(&request).await?.json()
    }

    #[instrument(skip_all, fields(question_id = id))]
    pub async fn edit_question(&self, id: u64, question: &NewQuestion) -> Result<Question> {
        check_question(question)?;
        let request = PendingRequest::patch(format!("/questions/{id}/")).json(question)?;
        self.api.send(&request).await?.json()
    }

    #[instrument(skip_all, fields(question_id = id))]
    pub async fn delete_question(&self, id: u64) -> Result<()> {
        self.api
            .send(&PendingRequest::delete(format!("/questions/{id}/")))
            .await?;
        Ok(())
    }

    #[instrument(skip_all, fields(question_id = question_id))]
    pub async fn answer(&self, question_id: u64, content: &str) -> Result<Answer> {
        require("content", content)?;
        self.api
            .post(
                &format!("/questions/{question_id}/answers/"),
                json!({ "content": content }),
            )
            .await?
            .json()
    }

    /// Replace an answer's body. Only its author may do this.
    #[instrument(skip_all, fields(answer_id = id))]
    pub async fn edit_answer(&self, id: u64, content: &str) -> Result<Answer> {
        require("content", content)?;
        let request =
            PendingRequest::patch(format!("/answers/{id}/")).body(json!({ "content": content }));
        self.api.send(&request).await?.json()
    }

    #[instrument(skip_all, fields(answer_id = id))]
    pub async fn delete_answer(&self, id: u64) -> Result<()> {
        self.api
            .send(&PendingRequest::delete(format!("/answers/{id}/")))
            .await?;
        Ok(())
    }

    /// Mark an answer as accepted. Only the question's author may do this.
    #[instrument(skip_all, fields(answer_id = answer_id))]
    pub async fn accept(&self, answer_id: u64) -> Result<Answer> {
        self.api
            .send(&PendingRequest::post(format!("/answers/{answer_id}/accept/")))
            .await?
            .json()
    }

    #[instrument(skip_all, fields(target = ?target, vote = vote.value()))]
    pub async fn vote(&self, target: VoteTarget, vote: Vote) -> Result<VoteOutcome> {
        self.api
            .post(&target.path(), json!({ "value": vote.value() }))
            .await?
            .json()
    }

    #[instrument(skip_all, fields(answer_id = answer_id))]
    pub async fn comment(&self, answer_id: u64, content: &str) -> Result<Comment> {
        require("content", content)?;
        self.api
            .post(
                &format!("/answers/{answer_id}/comments/"),
                json!({ "content": content }),
            )
            .await?
            .json()
    }

    pub async fn tags(&self) -> Result<Listing<Tag>> {
        self.api.get("/tags/").await?.listing()
    }

    pub async fn profile(&self) -> Result<Profile> {
        self.api.get("/auth/profile/").await?.json()
    }

    pub async fn user(&self, id: u64) -> Result<User> {
        self.api.get(&format!("/auth/users/{id}/")).await?.json()
    }
}

fn check_question(question: &NewQuestion) -> Result<()> {
    require("title", &question.title)?;
    require("content", &question.content)
}
