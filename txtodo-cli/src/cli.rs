use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use txtodo_core::SortMode;

#[derive(Parser, Debug)]
#[command(name = "txtodo")]
#[command(about = "Keep your tasks in a plain todo.txt file")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = concat!(
    "v",
    env!("CARGO_PKG_VERSION"),
    "\nCodeName: ",
    env!("CODENAME")
))]
pub struct Cli {
    /// Todo file to use instead of the configured one
    #[arg(long, short = 'f', global = true, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Archive file to use instead of done.txt beside the todo file
    #[arg(long, global = true, value_name = "PATH")]
    pub archive: Option<PathBuf>,

    /// Disable colors
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    Due,
    Prio,
}

impl From<SortBy> for SortMode {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Due => SortMode::Due,
            SortBy::Prio => SortMode::Priority,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lists tasks
    List {
        /// Sort order (defaults to the configured one)
        #[arg(long, short = 's', value_enum)]
        sort: Option<SortBy>,
        /// Only tasks due within this many days, plus undated ones
        #[arg(long, short = 'd', allow_negative_numbers = true)]
        days: Option<i64>,
        /// Only tasks with this context
        #[arg(long, short = 'c', value_name = "CONTEXT")]
        context: Option<String>,
        /// Show raw lines instead of condensed descriptions
        #[arg(long, short = 'r')]
        raw: bool,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
        /// Words that must all appear in the task
        #[arg(num_args = 0..)]
        search: Vec<String>,
    },

    /// Adds a task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Replaces the text of a task
    Edit {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Marks a task done, scheduling the next one for recurring tasks
    Done {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
    },

    /// Marks a task pending again
    Undone {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
    },

    /// Sets, clears or cycles the priority of a task
    Prio {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
        /// A letter, `none`, `up` or `down`
        priority: String,
    },

    /// Sets or shifts the due date of a task
    Due {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
        /// e.g. `2024-06-01`, `tomorrow`, `fr`, `+3`, `1w`, `-2d`
        #[arg(allow_hyphen_values = true)]
        date: String,
    },

    /// Flags a task as deleted without removing it
    Delete {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
    },

    /// Clears the deleted flag of a task
    Restore {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
    },

    /// Removes a task from the file
    Remove {
        #[arg(value_parser = clap::value_parser!(u32))]
        id: u32,
    },

    /// Moves done and deleted tasks to the archive
    Archive,

    /// Restores the most recently archived task
    Unarchive,

    /// Lists all contexts
    Contexts,

    /// Lists all projects
    Projects,

    /// Prints the list again whenever the file changes
    Watch,
}
