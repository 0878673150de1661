//! # Ledge CLI - Local version control
//!
//! Command-line interface over the Ledge library.
//!
//! ## Usage
//! ```bash
//! # Initialize a repository in the current directory
//! ledge init
//!
//! # Stage and commit files
//! ledge add notes.txt src/main.rs
//! ledge commit -m "First draft"
//!
//! # Inspect state and history
//! ledge status
//! ledge log --limit 10
//!
//! # Branch, switch, merge
//! ledge branch ideas
//! ledge checkout ideas
//! ledge checkout main
//! ledge merge ideas
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ledge::{ChangeKind, MergeOutcome, Repository};

/// Ledge CLI - snapshot, branch and merge a local directory
#[derive(Parser)]
#[command(name = "ledge")]
#[command(version)]
#[command(about = "Local version control with content-addressable storage")]
struct Cli {
    /// Path to the working directory (defaults to current)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a repository
    Init,

    /// Stage files for the next commit
    Add {
        /// Files to stage
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Create a commit from the staged files
    #[command(alias = "ci")]
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Author name (defaults to $LEDGE_AUTHOR)
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Show staged, unstaged and untracked changes
    #[command(alias = "st")]
    Status,

    /// Show commit history, newest first
    Log {
        /// Branch to walk (defaults to current)
        branch: Option<String>,

        /// Limit the number of commits shown
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Create a branch, or list branches when no name is given
    #[command(alias = "br")]
    Branch {
        /// Name of the branch to create
        name: Option<String>,
    },

    /// Switch to another branch
    #[command(alias = "co")]
    Checkout {
        /// Branch to switch to
        branch: String,
    },

    /// Merge a branch into the current branch
    Merge {
        /// Branch to merge in
        branch: String,

        /// Author name for a merge commit (defaults to $LEDGE_AUTHOR)
        #[arg(short, long)]
        author: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .init();
    }

    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let root = cli.path.unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Commands::Init => cmd_init(root),
        Commands::Add { paths } => cmd_add(root, paths),
        Commands::Commit { message, author } => cmd_commit(root, message, author),
        Commands::Status => cmd_status(root),
        Commands::Log { branch, limit } => cmd_log(root, branch, limit),
        Commands::Branch { name } => cmd_branch(root, name),
        Commands::Checkout { branch } => cmd_checkout(root, branch),
        Commands::Merge { branch, author } => cmd_merge(root, branch, author),
    }
}

fn open(root: PathBuf) -> anyhow::Result<Repository> {
    Repository::open(&root).with_context(|| format!("not a repository: {}", root.display()))
}

fn author_or_default(author: Option<String>) -> String {
    author
        .or_else(|| std::env::var("LEDGE_AUTHOR").ok())
        .unwrap_or_else(|| "anonymous".to_string())
}

fn cmd_init(root: PathBuf) -> anyhow::Result<()> {
    let repo = Repository::init(&root)?;
    println!(
        "{} Initialized empty repository in {}",
        "✓".green().bold(),
        repo.work_root().display().to_string().cyan()
    );
    Ok(())
}

fn cmd_add(root: PathBuf, paths: Vec<PathBuf>) -> anyhow::Result<()> {
    let repo = open(root)?;
    let staged = repo.add(&paths)?;
    for (path, blob) in &staged {
        println!("{} {} ({})", "staged".green(), path, blob.short().yellow());
    }
    Ok(())
}

fn cmd_commit(root: PathBuf, message: String, author: Option<String>) -> anyhow::Result<()> {
    let repo = open(root)?;
    let author = author_or_default(author);
    let id = repo.commit(&message, &author)?;
    println!(
        "{} [{}] {}",
        "✓".green().bold(),
        id.short().yellow().bold(),
        message
    );
    Ok(())
}

fn cmd_status(root: PathBuf) -> anyhow::Result<()> {
    let repo = open(root)?;
    let status = repo.status()?;

    println!("On branch {}", status.branch.cyan().bold());

    if status.is_clean() {
        println!("Nothing to commit, working tree clean");
        return Ok(());
    }

    if !status.staged.is_empty() {
        println!("\n{}", "Changes to be committed:".green().bold());
        for (path, kind) in &status.staged {
            println!("  {} {}", change_label(kind).green(), path);
        }
    }
    if !status.unstaged.is_empty() {
        println!("\n{}", "Changes not staged:".yellow().bold());
        for (path, kind) in &status.unstaged {
            println!("  {} {}", change_label(kind).yellow(), path);
        }
    }
    if !status.untracked.is_empty() {
        println!("\n{}", "Untracked files:".red().bold());
        for path in &status.untracked {
            println!("  {}", path.red());
        }
    }
    Ok(())
}

fn change_label(kind: &ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Added => "added:   ",
        ChangeKind::Modified => "modified:",
        ChangeKind::Removed => "removed: ",
    }
}

fn cmd_log(root: PathBuf, branch: Option<String>, limit: Option<usize>) -> anyhow::Result<()> {
    let repo = open(root)?;
    let history = repo.log(branch.as_deref())?;
    let limit = limit.unwrap_or(usize::MAX);

    let mut shown = 0;
    for entry in history.take(limit) {
        let (id, commit) = entry?;
        println!("{} {}", "commit".yellow(), id.as_str().yellow());
        if commit.is_merge() {
            let short: Vec<&str> = commit.parents.iter().map(|p| p.short()).collect();
            println!("Merge: {}", short.join(" "));
        }
        println!("Author: {}", commit.author);
        println!("Date:   {}", commit.timestamp.format("%Y-%m-%d %H:%M:%S %z"));
        println!("\n    {}\n", commit.message);
        shown += 1;
    }
    if shown == 0 {
        println!("No commits yet");
    }
    Ok(())
}

fn cmd_branch(root: PathBuf, name: Option<String>) -> anyhow::Result<()> {
    let repo = open(root)?;
    match name {
        Some(name) => {
            repo.branch(&name)?;
            println!("{} Created branch '{}'", "✓".green().bold(), name.cyan());
        }
        None => {
            let current = repo.current_branch()?;
            let branches = repo.branches()?;
            if branches.is_empty() {
                println!("No branches yet (no commits)");
            }
            for branch in branches {
                if branch == current {
                    println!("{} {}", "*".green().bold(), branch.green());
                } else {
                    println!("  {}", branch);
                }
            }
        }
    }
    Ok(())
}

fn cmd_checkout(root: PathBuf, branch: String) -> anyhow::Result<()> {
    let repo = open(root)?;
    repo.checkout(&branch)?;
    println!(
        "{} Switched to branch '{}'",
        "✓".green().bold(),
        branch.cyan()
    );
    Ok(())
}

fn cmd_merge(root: PathBuf, branch: String, author: Option<String>) -> anyhow::Result<()> {
    let repo = open(root)?;
    let author = author_or_default(author);

    match repo.merge(&branch, &author)? {
        MergeOutcome::NoOp => {
            println!("Already up to date");
        }
        MergeOutcome::FastForward(tip) => {
            println!(
                "{} Fast-forwarded to {}",
                "✓".green().bold(),
                tip.short().yellow()
            );
        }
        MergeOutcome::Merged(tip) => {
            println!(
                "{} Merged '{}' as {}",
                "✓".green().bold(),
                branch.cyan(),
                tip.short().yellow()
            );
        }
        MergeOutcome::Conflicts(paths) => {
            eprintln!("{}", "Merge refused, conflicting paths:".red().bold());
            for path in &paths {
                eprintln!("  {}", path.red());
            }
            bail!("{} conflicting path(s)", paths.len());
        }
    }
    Ok(())
}
