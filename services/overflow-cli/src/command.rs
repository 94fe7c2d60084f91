//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use qa_api::{NewQuestion, QuestionFilter, Sort, Vote, VoteTarget};

/// Mini Overflow command-line client
#[derive(Debug, Parser)]
#[command(name = "overflow", version, arg_required_else_help = true)]
pub struct Cli {
    /// Config file [default: $OVERFLOW_CONFIG, then ./overflow.toml]
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Subcommand)]
pub enum Command {
    /// Log in and store the token pair
    Login { username: String, password: String },
    /// Create an account; log in separately afterwards
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Forget the stored tokens
    Logout,
    /// Describe the stored session without contacting the server
    Status,
    /// List questions
    Questions(ListArgs),
    /// Show a question with its answers and comments
    Show { id: u64 },
    /// Post a question
    Ask(AskArgs),
    /// Answer a question
    Answer { question_id: u64, content: String },
    /// Replace the body of one of your answers
    EditAnswer { answer_id: u64, content: String },
    /// Delete one of your answers
    DeleteAnswer { answer_id: u64 },
    /// Comment on an answer
    Comment { answer_id: u64, content: String },
    /// Vote on a question or an answer
    Vote {
        target: TargetKind,
        id: u64,
        direction: Direction,
    },
    /// Accept an answer to one of your questions
    Accept { answer_id: u64 },
    /// List tags
    Tags,
    /// Show your own profile
    Profile,
    /// Show a user's public profile
    User { id: u64 },
}

#[derive(Debug, Default, PartialEq, Eq, Args)]
pub struct ListArgs {
    /// Only questions carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Only questions without answers
    #[arg(long)]
    pub unanswered: bool,
    #[arg(long, value_enum, default_value_t = SortOrder::Recent)]
    pub sort: SortOrder,
    /// Full-text search
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: Option<u32>,
}

impl From<ListArgs> for QuestionFilter {
    fn from(args: ListArgs) -> Self {
        Self {
            tag: args.tag,
            unanswered: args.unanswered,
            sort: args.sort.into(),
            search: args.search,
            page: args.page,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Args)]
pub struct AskArgs {
    pub title: String,
    pub content: String,
    /// Tag ids, comma separated
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub tags: Vec<u64>,
}

impl From<AskArgs> for NewQuestion {
    fn from(args: AskArgs) -> Self {
        NewQuestion::new(args.title, args.content).with_tags(args.tags)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Newest first
    #[default]
    Recent,
    /// Highest score first
    Votes,
}

impl From<SortOrder> for Sort {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Recent => Sort::Recent,
            SortOrder::Votes => Sort::Votes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetKind {
    Question,
    Answer,
}

impl TargetKind {
    pub fn at(self, id: u64) -> VoteTarget {
        match self {
            TargetKind::Question => VoteTarget::Question(id),
            TargetKind::Answer => VoteTarget::Answer(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for Vote {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => Vote::Up,
            Direction::Down => Vote::Down,
        }
    }
}
