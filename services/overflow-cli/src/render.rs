//! Plain-text rendering of API resources

use std::fmt::Write;

use api_client::Listing;
use qa_api::{Answer, Profile, Question, QuestionSummary, Tag, User, VoteOutcome};
use session_store::AccessClaims;

pub fn question_list(listing: &Listing<QuestionSummary>) -> String {
    if listing.items.is_empty() {
        return "No questions found.\n".into();
    }
    let mut out = String::new();
    for q in &listing.items {
        let accepted = if q.has_accepted_answer { " ✓" } else { "" };
        let _ = writeln!(
            out,
            "#{:<5} {:>3} votes {:>3} answers{accepted}  {}",
            q.id, q.vote_count, q.answer_count, q.title
        );
        let tags = tag_names(&q.tags);
        let _ = writeln!(
            out,
            "       by {} · {} views{}",
            q.author.username,
            q.views,
            if tags.is_empty() {
                String::new()
            } else {
                format!(" · [{tags}]")
            }
        );
    }
    match (listing.total, listing.next_page()) {
        (Some(total), Some(next)) => {
            let _ = writeln!(out, "\n{total} questions total; next page: --page {next}");
        }
        (Some(total), None) => {
            let _ = writeln!(out, "\n{total} questions total");
        }
        (None, _) if listing.has_more() => {
            let _ = writeln!(out, "\nMore results available.");
        }
        _ => {}
    }
    out
}

pub fn question(q: &Question) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{} {}", q.id, q.title);
    let _ = writeln!(
        out,
        "asked by {} · {} votes{} · {} views",
        q.author.username,
        q.vote_count,
        your_vote(q.user_vote),
        q.views
    );
    let tags = tag_names(&q.tags);
    if !tags.is_empty() {
        let _ = writeln!(out, "tags: {tags}");
    }
    let _ = writeln!(out, "\n{}\n", q.content.trim_end());

    let _ = writeln!(out, "{} answer(s)", q.answers.len());
    for a in &q.answers {
        out.push_str(&answer(a));
    }
    out
}

pub fn answer(a: &Answer) -> String {
    let mut out = String::new();
    let accepted = if a.is_accepted { " [accepted]" } else { "" };
    let _ = writeln!(
        out,
        "\n  answer #{} by {} · {} votes{}{accepted}",
        a.id,
        a.author.username,
        a.vote_count,
        your_vote(a.user_vote)
    );
    for line in a.content.lines() {
        let _ = writeln!(out, "  {line}");
    }
    for c in &a.comments {
        let _ = writeln!(out, "    - {}: {}", c.author.username, c.content);
    }
    out
}

pub fn vote(outcome: &VoteOutcome) -> String {
    format!(
        "Vote recorded ({}). Score is now {}.\n",
        if outcome.user_vote > 0 { "up" } else { "down" },
        outcome.vote_count
    )
}

pub fn tags(listing: &Listing<Tag>) -> String {
    if listing.items.is_empty() {
        return "No tags.\n".into();
    }
    let mut out = String::new();
    for t in &listing.items {
        let _ = write!(out, "{:>4}  {:<20} {:>4} questions", t.id, t.name, t.questions_count);
        match t.description.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => {
                let _ = writeln!(out, "  {d}");
            }
            _ => out.push('\n'),
        }
    }
    out
}

pub fn user(u: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", u.username, u.id);
    let _ = writeln!(out, "reputation: {}", u.reputation);
    let _ = writeln!(
        out,
        "questions: {} · answers: {}",
        u.questions_count, u.answers_count
    );
    if let Some(bio) = u.bio.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
        let _ = writeln!(out, "bio: {bio}");
    }
    if let Some(joined) = &u.created_at {
        let _ = writeln!(out, "joined: {joined}");
    }
    out
}

pub fn profile(p: &Profile) -> String {
    let mut out = user(&p.user);
    if !p.user.email.is_empty() {
        let _ = writeln!(out, "email: {}", p.user.email);
    }
    let _ = writeln!(out, "total votes received: {}", p.total_votes);
    out
}

/// Session summary from the unverified access token claims.
pub fn status(claims: Option<&AccessClaims>, has_refresh: bool, now: u64) -> String {
    let Some(claims) = claims else {
        return if has_refresh {
            "No access token stored; the refresh token will renew the session on the next authenticated request.\n".into()
        } else {
            "Not logged in.\n".into()
        };
    };
    let mut out = String::from("Logged in");
    if let Some(id) = claims.user_id {
        let _ = write!(out, " as user #{id}");
    }
    out.push('\n');
    if claims.is_expired_at(now) {
        let _ = writeln!(
            out,
            "access token expired{}",
            if has_refresh {
                "; it will be refreshed on the next request"
            } else {
                ""
            }
        );
    } else if let Some(left) = claims.seconds_left(now) {
        let _ = writeln!(out, "access token expires in {}", duration(left));
    }
    if !has_refresh {
        out.push_str("no refresh token stored\n");
    }
    out
}

fn duration(secs: i64) -> String {
    match secs {
        s if s >= 3600 => format!("{}h {}m", s / 3600, (s % 3600) / 60),
        s if s >= 60 => format!("{}m {}s", s / 60, s % 60),
        s => format!("{s}s"),
    }
}

fn tag_names(tags: &[Tag]) -> String {
    tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
}

fn your_vote(vote: Option<i8>) -> &'static str {
    match vote {
        Some(v) if v > 0 => " (you: up)",
        Some(_) => " (you: down)",
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_named(name: &str) -> User {
        User {
            id: 7,
            username: name.into(),
            email: format!("{name}@example.com"),
            bio: Some("Rustacean".into()),
            avatar: None,
            reputation: 42,
            created_at: Some("2025-01-01T00:00:00Z".into()),
            questions_count: 3,
            answers_count: 8,
        }
    }

    fn tag(id: u64, name: &str) -> Tag {
        Tag {
            id,
            name: name.into(),
            description: None,
            questions_count: 2,
        }
    }

    fn summary(id: u64, accepted: bool) -> QuestionSummary {
        QuestionSummary {
            id,
            title: "How do lifetimes work?".into(),
            author: user_named("alice"),
            tags: vec![tag(1, "rust"), tag(2, "lifetimes")],
            vote_count: 5,
            answer_count: 2,
            has_accepted_answer: accepted,
            views: 120,
            created_at: "2025-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn empty_question_list() {
        let listing = Listing {
            items: Vec::<QuestionSummary>::new(),
            next: None,
            previous: None,
            total: Some(0),
        };
        assert_eq!(question_list(&listing), "No questions found.\n");
    }

    #[test]
    fn question_list_shows_paging_hint() {
        let listing = Listing {
            items: vec![summary(1, true)],
            next: Some("https://example.com/api/questions/?page=2".into()),
            previous: None,
            total: Some(21),
        };
        let out = question_list(&listing);
        assert!(out.contains("How do lifetimes work?"));
        assert!(out.contains("✓"));
        assert!(out.contains("[rust, lifetimes]"));
        assert!(out.contains("next page: --page 2"), "{out}");
    }

    #[test]
    fn question_detail_lists_answers_and_comments() {
        let q = Question {
            id: 1,
            title: "Borrowck".into(),
            content: "Why?".into(),
            author: user_named("alice"),
            tags: vec![],
            vote_count: 1,
            answer_count: 1,
            answers: vec![Answer {
                id: 11,
                question: 1,
                author: user_named("bob"),
                content: "Because.".into(),
                is_accepted: true,
                vote_count: 3,
                user_vote: Some(1),
                comments: vec![qa_api::Comment {
                    id: 1,
                    author: user_named("carol"),
                    content: "Agreed".into(),
                    created_at: "2025-01-01T00:00:00Z".into(),
                }],
                created_at: "2025-01-01T00:00:00Z".into(),
                updated_at: None,
            }],
            user_vote: None,
            views: 3,
            created_at: "2025-01-01T00:00:00Z".into(),
            updated_at: None,
        };
        let out = question(&q);
        assert!(out.contains("#1 Borrowck"));
        assert!(out.contains("answer #11 by bob · 3 votes (you: up) [accepted]"), "{out}");
        assert!(out.contains("- carol: Agreed"));
    }

    #[test]
    fn status_variants() {
        assert_eq!(status(None, false, 0), "Not logged in.\n");
        assert!(status(None, true, 0).starts_with("No access token stored; the refresh token"));

        let claims = AccessClaims {
            user_id: Some(7),
            exp: Some(1_000 + 3_725),
            token_type: Some("access".into()),
        };
        let out = status(Some(&claims), true, 1_000);
        assert!(out.starts_with("Logged in as user #7"));
        assert!(out.contains("expires in 1h 2m"), "{out}");

        let out = status(Some(&claims), false, 10_000);
        assert!(out.contains("access token expired\n"), "{out}");
        assert!(out.contains("no refresh token stored"));

        let out = status(Some(&claims), true, 1_000 + 3_725);
        assert!(out.contains("expired; it will be refreshed"), "{out}");
    }

    #[test]
    fn vote_message() {
        let out = vote(&VoteOutcome {
            vote_count: -2,
            user_vote: -1,
        });
        assert_eq!(out, "Vote recorded (down). Score is now -2.\n");
    }

    #[test]
    fn profile_includes_totals() {
        let p = Profile {
            user: user_named("alice"),
            total_votes: 17,
        };
        let out = profile(&p);
        assert!(out.contains("alice (#7)"));
        assert!(out.contains("reputation: 42"));
        assert!(out.contains("total votes received: 17"));
    }
}
