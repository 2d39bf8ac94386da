use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::mpsc;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use txtodo_core::date::{self, next_monday};
use txtodo_core::filter::filter_done_or_deleted;
use txtodo_core::{Completion, ListChange, TaskId, TaskList, TaskView};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::display::{RowStyle, format_summary, format_task, supports_color};
use crate::error::{CliError, Result};
use crate::watcher::EventWatch;

mod cli;
mod config;
mod display;
mod error;
mod watcher;

fn main() -> Result<()> {
    install_tracing();
    let cli = Cli::parse();
    let cfg = Config::load()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &cfg, date::today(), &mut out)
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`)
fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Create an empty todo file when its directory exists
fn ensure_todo_file(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(CliError::todo_file(path, "path is a directory, expected a file"));
    }
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    if !parent.is_dir() {
        return Err(CliError::todo_file(
            path,
            format!(
                "directory {} does not exist; create it or pass --file",
                parent.display()
            ),
        ));
    }
    fs::File::create(path)
        .map_err(|e| CliError::io(format!("Failed to create {}", path.display()), e))?;
    info!(path = %path.display(), "created empty todo file");
    Ok(())
}

struct ListOptions {
    view: TaskView,
    raw: bool,
    json: bool,
    use_color: bool,
}

fn print_list(
    out: &mut impl Write,
    list: &TaskList,
    options: &ListOptions,
    today: NaiveDate,
) -> Result<()> {
    let tasks = options.view.apply(list, today);

    if options.json {
        serde_json::to_writer_pretty(&mut *out, &tasks)?;
        writeln!(out)?;
        return Ok(());
    }

    if tasks.is_empty() {
        writeln!(out, "No tasks found.")?;
        return Ok(());
    }

    let style = RowStyle {
        today,
        next_week: next_monday(today),
        raw: options.raw,
        use_color: options.use_color,
        search: options.view.search.as_ref(),
    };
    for task in &tasks {
        writeln!(out, "{}", format_task(task, &style))?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format_summary(tasks.len(), list.summary(today), options.use_color)
    )?;
    Ok(())
}

fn run(cli: Cli, cfg: &Config, today: NaiveDate, out: &mut impl Write) -> Result<()> {
    let path = cfg.todo_path(cli.file)?;
    ensure_todo_file(&path)?;
    let mut list = TaskList::open(&path, cfg.archive_path(cli.archive))?;
    let use_color = !cli.no_color && cfg.color && supports_color();

    match cli.command {
        Commands::List {
            sort,
            days,
            context,
            raw,
            json,
            search,
        } => {
            let view = TaskView::new()
                .sort_by(sort.map_or(cfg.sort, Into::into))
                .within_days(days.unwrap_or(cfg.days))
                .with_context(context)
                .search(&search.join(" "));
            let options = ListOptions {
                view,
                raw,
                json,
                use_color,
            };
            print_list(out, &list, &options, today)?;
        }

        Commands::Add { text } => {
            let task = list.append(&text.join(" "));
            task.finish_edit(today);
            let (id, line) = (task.id(), task.raw().to_string());
            list.save()?;
            writeln!(out, "Added task #{}: {}", id, line)?;
        }

        Commands::Edit { id, text } => {
            let task = list.get_mut_or_err(TaskId(id))?;
            task.update(&text.join(" "));
            task.finish_edit(today);
            let line = task.raw().to_string();
            list.save()?;
            writeln!(out, "Updated task #{}: {}", id, line)?;
        }

        Commands::Done { id } => {
            match list.complete(TaskId(id), today)? {
                Completion::Unchanged => {
                    writeln!(out, "Task #{} is already done", id)?;
                    return Ok(());
                }
                Completion::Done => writeln!(out, "Completed task #{}", id)?,
                Completion::Recurred { done, next_due } => writeln!(
                    out,
                    "Completed task #{} as #{}; next due {}",
                    id,
                    done,
                    next_due.format(date::ISO_FORMAT)
                )?,
            }
            list.save()?;
        }

        Commands::Undone { id } => {
            list.get_mut_or_err(TaskId(id))?.set_done(false, today);
            list.save()?;
            writeln!(out, "Reopened task #{}", id)?;
        }

        Commands::Prio { id, priority } => {
            let task = list.get_mut_or_err(TaskId(id))?;
            match priority.to_lowercase().as_str() {
                "none" | "-" => task.set_priority(None),
                "up" => task.cycle_priority(-1),
                "down" => task.cycle_priority(1),
                letter => {
                    let mut chars = letter.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) if c.is_ascii_alphabetic() => task.set_priority(Some(c)),
                        _ => {
                            return Err(CliError::parse(format!(
                                "Invalid priority '{}', expected a letter, none, up or down",
                                priority
                            )));
                        }
                    }
                }
            }
            let line = task.raw().to_string();
            list.save()?;
            writeln!(out, "Updated task #{}: {}", id, line)?;
        }

        Commands::Due { id, date: expression } => {
            let task = list.get_mut_or_err(TaskId(id))?;
            let due = match date::parse_iso(&expression) {
                Ok(due) => {
                    task.set_due(due);
                    due
                }
                Err(_) => task.shift_due(&expression, today).ok_or_else(|| {
                    CliError::validation("due", format!("unrecognized date '{}'", expression))
                })?,
            };
            list.save()?;
            writeln!(
                out,
                "Task #{} is due {}",
                id,
                date::humanize_date(Some(due), today)
            )?;
        }

        Commands::Delete { id } => {
            list.get_mut_or_err(TaskId(id))?.set_deleted(true);
            list.save()?;
            writeln!(out, "Deleted task #{}", id)?;
        }

        Commands::Restore { id } => {
            list.get_mut_or_err(TaskId(id))?.set_deleted(false);
            list.save()?;
            writeln!(out, "Restored task #{}", id)?;
        }

        Commands::Remove { id } => {
            let task = list
                .delete_by_id(TaskId(id))
                .ok_or(txtodo_core::CoreError::TaskNotFound(id))?;
            list.save()?;
            writeln!(out, "Removed: {}", task.raw())?;
        }

        Commands::Archive => {
            if filter_done_or_deleted(&list).is_empty() {
                writeln!(out, "Nothing to archive.")?;
                return Ok(());
            }
            let count = list.archive_tasks(|t| t.is_done() || t.is_deleted())?;
            writeln!(
                out,
                "Archived {} task(s) to {}",
                count,
                list.archive_path()?.display()
            )?;
        }

        Commands::Unarchive => match list.undo_archive()? {
            Some(task) => writeln!(out, "Restored task #{}: {}", task.id(), task.raw())?,
            None => writeln!(out, "Archive is empty.")?,
        },

        Commands::Contexts => {
            for context in list.all_contexts() {
                writeln!(out, "{}", context)?;
            }
        }

        Commands::Projects => {
            for project in list.all_projects() {
                writeln!(out, "{}", project)?;
            }
        }

        Commands::Watch => {
            let options = ListOptions {
                view: TaskView::new().sort_by(cfg.sort).within_days(cfg.days),
                raw: false,
                json: false,
                use_color,
            };
            list.add_listener(|change: ListChange| debug!(?change, "list changed"));

            let (tx, rx) = mpsc::channel();
            let mut watch = EventWatch::new();
            list.watch(
                &mut watch,
                Box::new(move || {
                    let _ = tx.send(());
                }),
            )?;

            print_list(out, &list, &options, today)?;
            out.flush()?;
            while rx.recv().is_ok() {
                if list.check_for_changes()? {
                    writeln!(out)?;
                    print_list(out, &list, &options, date::today())?;
                    out.flush()?;
                }
            }
        }
    }

    Ok(())
}
