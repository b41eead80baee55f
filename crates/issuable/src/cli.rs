//! Command-line interface definitions using clap.

use crate::domain::{IssuableId, IssuableKind, MilestoneId, ProjectId, State, UserId};
use crate::query::IssuableFilter;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Issuable tracker
///
/// Issues and merge requests with label, assignee, milestone and state
/// filters, milestone and vote ordering.
///
/// The data directory defaults to `.issuable` in the current directory and
/// can be moved with ISSUABLE_DATA_DIR.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments or usage error
///   3  - Resource not found (issuable, milestone, award)
///   4  - Validation failed (title, author, note body)
#[derive(Parser)]
#[command(name = "issuable")]
#[command(about = "Issue and merge request tracker", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output JSON envelopes instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the data directory
    Init,

    /// Create an issue or merge request
    Create {
        /// Title (trimmed, at most 255 characters)
        title: String,

        #[arg(long)]
        project: ProjectId,

        #[arg(long)]
        author: UserId,

        /// issue or merge_request
        #[arg(long, default_value = "issue")]
        kind: IssuableKind,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long)]
        assignee: Option<UserId>,

        #[arg(long)]
        milestone: Option<MilestoneId>,

        /// Labels to attach by name (repeatable, created if missing)
        #[arg(short, long)]
        label: Vec<String>,
    },

    /// List issuables matching filters
    List(ListArgs),

    /// Show one issuable
    Show { id: IssuableId },

    /// Close an open issuable
    Close { id: IssuableId },

    /// Reopen a closed issuable
    Reopen { id: IssuableId },

    /// Set or clear the assignee
    Assign {
        id: IssuableId,

        /// New assignee; omit to unassign
        user: Option<UserId>,
    },

    /// Label commands
    #[command(subcommand)]
    Label(LabelCommands),

    /// Add an award reaction (thumbsup and thumbsdown count as votes)
    Award {
        id: IssuableId,

        /// Reaction name
        name: String,

        #[arg(long)]
        user: UserId,
    },

    /// Milestone commands
    #[command(subcommand)]
    Milestone(MilestoneCommands),
}

impl Commands {
    /// Command name reported in JSON metadata
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Init => "init",
            Commands::Create { .. } => "create",
            Commands::List(_) => "list",
            Commands::Show { .. } => "show",
            Commands::Close { .. } => "close",
            Commands::Reopen { .. } => "reopen",
            Commands::Assign { .. } => "assign",
            Commands::Label(LabelCommands::Add { .. }) => "label add",
            Commands::Label(LabelCommands::Clear { .. }) => "label clear",
            Commands::Award { .. } => "award",
            Commands::Milestone(MilestoneCommands::Create { .. }) => "milestone create",
        }
    }
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Case-insensitive substring of the title
    #[arg(short, long)]
    pub search: Option<String>,

    /// Also search descriptions
    #[arg(long, requires = "search")]
    pub in_description: bool,

    /// Require every listed label (repeatable)
    #[arg(short, long, conflicts_with = "no_label")]
    pub label: Vec<String>,

    /// Only issuables without labels
    #[arg(long)]
    pub no_label: bool,

    #[arg(long, conflicts_with_all = ["unassigned", "assigned"])]
    pub assignee: Option<UserId>,

    #[arg(long, conflicts_with = "assigned")]
    pub unassigned: bool,

    /// Only issuables with any assignee
    #[arg(long)]
    pub assigned: bool,

    #[arg(long)]
    pub author: Option<UserId>,

    /// Milestone title
    #[arg(long)]
    pub milestone: Option<String>,

    /// Project id (repeatable)
    #[arg(long)]
    pub project: Vec<ProjectId>,

    /// State (repeatable): opened, reopened, closed
    #[arg(long)]
    pub state: Vec<State>,

    #[arg(long)]
    pub kind: Option<IssuableKind>,

    /// milestone_due_asc, milestone_due_desc, upvotes_desc, downvotes_desc,
    /// recent, id_asc, created_asc, created_desc, updated_asc, updated_desc
    #[arg(long)]
    pub sort: Option<String>,
}

impl ListArgs {
    /// Translate command-line flags into a query filter.
    pub fn to_filter(&self) -> IssuableFilter {
        let mut filter = IssuableFilter::new();

        if let Some(query) = &self.search {
            filter = if self.in_description {
                filter.full_search(query.clone())
            } else {
                filter.search(query.clone())
            };
        }
        if self.no_label {
            filter = filter.without_label();
        } else if !self.label.is_empty() {
            filter = filter.with_labels(self.label.iter().cloned());
        }
        if let Some(user_id) = self.assignee {
            filter = filter.assigned_to(user_id);
        } else if self.unassigned {
            filter = filter.unassigned();
        } else if self.assigned {
            filter = filter.assigned();
        }
        if let Some(author_id) = self.author {
            filter = filter.authored(author_id);
        }
        if let Some(title) = &self.milestone {
            filter = filter.with_milestone(title.clone());
        }
        if !self.project.is_empty() {
            filter = filter.of_projects(self.project.iter().copied());
        }
        if !self.state.is_empty() {
            filter = filter.with_states(self.state.iter().copied());
        }
        if let Some(kind) = self.kind {
            filter = filter.of_kind(kind);
        }
        if let Some(sort) = &self.sort {
            filter = filter.sort(sort.clone());
        }
        filter
    }
}

#[derive(Subcommand)]
pub enum LabelCommands {
    /// Attach labels by name, creating missing ones
    Add {
        id: IssuableId,

        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Detach all labels from an issuable
    Clear { id: IssuableId },
}

#[derive(Subcommand)]
pub enum MilestoneCommands {
    /// Create a milestone
    Create {
        title: String,

        #[arg(long)]
        project: ProjectId,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
    },
}
