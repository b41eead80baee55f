//! Issuable tracker
//!
//! A data-directory-local tracker for issues and merge requests with
//! label, assignee, milestone and state filtering, milestone-due and vote
//! ordering, and machine-friendly JSON output.

use anyhow::Result;
use clap::Parser;
use issuable::assignee_cache::OpenCountCache;
use issuable::cli::{Cli, Commands, LabelCommands, MilestoneCommands};
use issuable::commands::{CommandExecutor, Transitioned};
use issuable::config::IssuableConfig;
use issuable::domain::{IssuableId, NewIssuable};
use issuable::output::{
    format_issuable_line, ErrorCode, ExitCode, JsonError, JsonOutput, OutputContext,
};
use issuable::storage::JsonFileStorage;
use issuable::IssuableError;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type Executor = CommandExecutor<JsonFileStorage, OpenCountCache<JsonFileStorage>>;

fn main() {
    let cli = Cli::parse();
    let json = cli.json;
    let command = cli.command.name();

    let exit_code = match run(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => report_error(&e, json, command),
    };

    if exit_code != ExitCode::Success {
        std::process::exit(exit_code.code());
    }
}

/// Print an error the way the caller asked for and pick the exit code.
fn report_error(error: &anyhow::Error, json: bool, command: &str) -> ExitCode {
    let typed = error.downcast_ref::<IssuableError>();
    let exit_code = typed.map(ExitCode::from).unwrap_or(ExitCode::GenericError);

    if json {
        let envelope = match typed {
            Some(err) => JsonError::from_error(err, command),
            None => JsonError::new(ErrorCode::GENERIC_ERROR, format!("{:#}", error), command),
        };
        match envelope.to_json_string() {
            Ok(out) => println!("{}", out),
            Err(_) => eprintln!("Error: {:#}", error),
        }
    } else {
        eprintln!("Error: {:#}", error);
    }
    exit_code
}

/// Data directory: ISSUABLE_DATA_DIR or `.issuable` under the current
/// directory.
fn data_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir()?;
    Ok(match env::var("ISSUABLE_DATA_DIR") {
        Ok(custom_dir) => current_dir.join(custom_dir),
        Err(_) => current_dir.join(".issuable"),
    })
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let data_dir = data_dir()?;

    let config = IssuableConfig::load(&data_dir);
    let level = config
        .as_ref()
        .map(IssuableConfig::log_level)
        .unwrap_or_else(|_| "warn".to_string());
    init_tracing(&level);
    let config = config?;

    let storage = JsonFileStorage::new(&data_dir);
    let cache = OpenCountCache::new(storage.clone());
    let executor: Executor =
        CommandExecutor::with_cache(storage.clone(), cache).with_config(&config);
    let out = OutputContext::new(cli.quiet, cli.json);

    if !matches!(cli.command, Commands::Init) {
        storage.validate()?;
    }

    match cli.command {
        Commands::Init => {
            executor.init()?;
            out.print_json(&JsonOutput::success(
                serde_json::json!({ "data_dir": data_dir.display().to_string() }),
                "init",
            ))?;
            out.print_info(format!(
                "Initialized issuable store in {}",
                data_dir.display()
            ))?;
        }

        Commands::Create {
            title,
            project,
            author,
            kind,
            description,
            assignee,
            milestone,
            label,
        } => {
            let mut new = NewIssuable::new(project, title, author)
                .with_kind(kind)
                .with_description(description);
            if let Some(user_id) = assignee {
                new = new.with_assignee(user_id);
            }
            if let Some(milestone_id) = milestone {
                new = new.with_milestone(milestone_id);
            }

            let created = executor.create_issuable(new)?;
            if !label.is_empty() {
                executor.add_labels_by_names(created.id, &label)?;
            }
            let issuable = executor.show_issuable(created.id)?;

            out.print_json(&JsonOutput::success(&issuable, "create"))?;
            if out.is_quiet() {
                out.print_data(issuable.id)?;
            } else {
                out.print_data(format!("Created {} #{}", issuable.kind, issuable.id))?;
            }
        }

        Commands::List(args) => {
            let issuables = executor.query(&args.to_filter())?;

            out.print_json(&JsonOutput::success(&issuables, "list"))?;
            for issuable in &issuables {
                out.print_data(format_issuable_line(issuable))?;
            }
            if issuables.is_empty() {
                out.print_info("No issuables found")?;
            }
        }

        Commands::Show { id } => show(&executor, &out, id)?,

        Commands::Close { id } => {
            let outcome = executor.close(id)?;
            print_transition(&out, &outcome, "close", "Closed")?;
        }

        Commands::Reopen { id } => {
            let outcome = executor.reopen(id)?;
            print_transition(&out, &outcome, "reopen", "Reopened")?;
        }

        Commands::Assign { id, user } => {
            let issuable = executor.assign(id, user)?;

            out.print_json(&JsonOutput::success(&issuable, "assign"))?;
            match user {
                Some(user_id) => {
                    let open = executor.cache().open_count(user_id).unwrap_or(0);
                    out.print_data(format!(
                        "Assigned #{} to user {} ({} open)",
                        id, user_id, open
                    ))?;
                }
                None => out.print_data(format!("Unassigned #{}", id))?,
            }
        }

        Commands::Label(LabelCommands::Add { id, names }) => {
            executor.add_labels_by_names(id, &names)?;
            let attached = executor.label_names(id)?;

            out.print_json(&JsonOutput::success(&attached, "label add"))?;
            out.print_data(format!("Labels on #{}: {}", id, attached.join(", ")))?;
        }

        Commands::Label(LabelCommands::Clear { id }) => {
            executor.remove_labels(id)?;

            out.print_json(&JsonOutput::success(
                serde_json::json!({ "id": id }),
                "label clear",
            ))?;
            out.print_data(format!("Removed all labels from #{}", id))?;
        }

        Commands::Award { id, name, user } => {
            let note = executor.award(id, user, &name)?;
            let (up, down) = (executor.upvotes(id)?, executor.downvotes(id)?);

            out.print_json(&JsonOutput::success(
                serde_json::json!({ "note": &note, "upvotes": up, "downvotes": down }),
                "award",
            ))?;
            out.print_data(format!(
                "Awarded {} on #{} (+{} -{})",
                note.body, id, up, down
            ))?;
        }

        Commands::Milestone(MilestoneCommands::Create {
            title,
            project,
            due,
        }) => {
            let milestone = executor.create_milestone(project, &title, due)?;

            out.print_json(&JsonOutput::success(&milestone, "milestone create"))?;
            if out.is_quiet() {
                out.print_data(milestone.id)?;
            } else {
                out.print_data(format!(
                    "Created milestone #{}: {}",
                    milestone.id, milestone.title
                ))?;
            }
        }
    }

    Ok(())
}

fn show(executor: &Executor, out: &OutputContext, id: IssuableId) -> Result<()> {
    let issuable = executor.show_issuable(id)?;

    if out.is_json() {
        let labels = executor.label_names(id)?;
        out.print_json(&JsonOutput::success(
            serde_json::json!({
                "issuable": &issuable,
                "labels": labels,
                "upvotes": issuable.upvotes(),
                "downvotes": issuable.downvotes(),
                "user_notes_count": issuable.user_notes_count(),
            }),
            "show",
        ))?;
        return Ok(());
    }

    out.print_data(format_issuable_line(&issuable))?;
    let labels = executor.label_names(id)?;
    if !labels.is_empty() {
        out.print_data(format!("  labels: {}", labels.join(", ")))?;
    }
    out.print_data(format!(
        "  votes: +{} -{}",
        issuable.upvotes(),
        issuable.downvotes()
    ))?;
    out.print_data(format!("  notes: {}", issuable.user_notes_count()))?;
    if issuable.is_deleted() {
        out.print_data("  deleted")?;
    }
    Ok(())
}

fn print_transition(
    out: &OutputContext,
    outcome: &Transitioned,
    command: &str,
    verb: &str,
) -> Result<()> {
    let id = outcome.issuable.id;
    out.print_json(&JsonOutput::success(outcome, command))?;
    if outcome.changed {
        out.print_data(format!("{} #{}", verb, id))?;
    } else {
        out.print_info(format!("#{} is already {}", id, outcome.issuable.state))?;
    }
    Ok(())
}
