//! vers CLI - thin driver over the porcelain operations

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vers::ops::{
    self, CommitOptions, InitOptions, RmOptions, UpdateIndexOptions,
};
use vers::transport::{self, CloneOptions};
use vers::Repo;

#[derive(Parser)]
#[command(name = "vers")]
#[command(about = "minimal distributed version control")]
#[command(version)]
struct Cli {
    /// repository path (any directory inside the working tree)
    #[arg(short, long, default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository
    Init {
        /// path to create the repository at
        #[arg(default_value = ".")]
        path: PathBuf,

        /// create a bare repository
        #[arg(long)]
        bare: bool,
    },

    /// stage files under a path
    Add {
        /// file or directory to stage
        path: String,
    },

    /// remove files from the index and working copy
    Rm {
        /// file or directory to remove
        path: String,

        /// remove directories recursively
        #[arg(short)]
        recursive: bool,

        /// force removal (not implemented)
        #[arg(short)]
        force: bool,
    },

    /// commit the index
    Commit {
        /// commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// create a branch, or list branches
    Branch {
        /// branch name
        name: Option<String>,
    },

    /// switch to another branch or commit
    Checkout {
        /// branch name or commit hash
        r#ref: String,
    },

    /// show a name-status diff
    Diff {
        /// left revision (defaults to the index)
        ref1: Option<String>,

        /// right revision (defaults to the working copy)
        ref2: Option<String>,
    },

    /// merge a revision into the current branch
    Merge {
        /// branch name or commit hash
        r#ref: String,
    },

    /// manage remotes (only `add`)
    Remote {
        /// subcommand, only "add"
        command: String,

        /// remote name
        name: String,

        /// remote path
        url: String,
    },

    /// fetch a branch from a remote
    Fetch {
        /// remote name
        remote: String,

        /// branch name
        branch: String,
    },

    /// push a branch to a remote
    Push {
        /// remote name
        remote: String,

        /// branch name
        branch: String,

        /// allow non-fast-forward updates
        #[arg(short, long)]
        force: bool,
    },

    /// fetch then merge a remote branch
    Pull {
        /// remote name
        remote: String,

        /// branch name
        branch: String,
    },

    /// clone a repository from a local path
    Clone {
        /// source repository path
        remote_path: String,

        /// target directory
        target_path: PathBuf,

        /// create a bare clone
        #[arg(long)]
        bare: bool,
    },

    /// show the working-copy status
    Status,

    /// show commit history
    Log {
        /// revision to start from
        #[arg(default_value = "HEAD")]
        r#ref: String,
    },

    /// stage or unstage a single path
    UpdateIndex {
        /// path to update
        path: String,

        /// allow adding unknown paths
        #[arg(long)]
        add: bool,

        /// remove the path from the index
        #[arg(long)]
        remove: bool,
    },

    /// point a ref at a commit
    UpdateRef {
        /// ref to update
        ref_to_update: String,

        /// ref or hash to point it at
        ref_or_hash: String,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> vers::Result<String> {
    match cli.command {
        Commands::Init { path, bare } => {
            let repo = ops::init(&path, InitOptions { bare })?;
            Ok(format!(
                "Initialized empty vers repository in {}",
                repo.storage_path().display()
            ))
        }

        Commands::Add { path } => {
            let repo = Repo::find(&cli.repo)?;
            ops::add(&repo, &path)?;
            Ok(String::new())
        }

        Commands::Rm {
            path,
            recursive,
            force,
        } => {
            let repo = Repo::find(&cli.repo)?;
            ops::rm(&repo, &path, RmOptions { force, recursive })?;
            Ok(String::new())
        }

        Commands::Commit { message } => {
            let repo = Repo::find(&cli.repo)?;
            ops::commit(&repo, &CommitOptions { message })
        }

        Commands::Branch { name } => {
            let repo = Repo::find(&cli.repo)?;
            ops::branch(&repo, name.as_deref())
        }

        Commands::Checkout { r#ref } => {
            let repo = Repo::find(&cli.repo)?;
            ops::checkout(&repo, &r#ref)
        }

        Commands::Diff { ref1, ref2 } => {
            let repo = Repo::find(&cli.repo)?;
            ops::diff(&repo, ref1.as_deref(), ref2.as_deref())
        }

        Commands::Merge { r#ref } => {
            let repo = Repo::find(&cli.repo)?;
            ops::merge(&repo, &r#ref)
        }

        Commands::Remote { command, name, url } => {
            let mut repo = Repo::find(&cli.repo)?;
            ops::remote(&mut repo, &command, &name, &url)
        }

        Commands::Fetch { remote, branch } => {
            let repo = Repo::find(&cli.repo)?;
            let result = transport::fetch(&repo, &remote, &branch)?;
            Ok(result.to_string())
        }

        Commands::Push {
            remote,
            branch,
            force,
        } => {
            let repo = Repo::find(&cli.repo)?;
            let outcome = transport::push(&repo, &remote, &branch, force)?;
            Ok(outcome.to_string())
        }

        Commands::Pull { remote, branch } => {
            let repo = Repo::find(&cli.repo)?;
            ops::pull(&repo, &remote, &branch)
        }

        Commands::Clone {
            remote_path,
            target_path,
            bare,
        } => transport::clone(&remote_path, &target_path, CloneOptions { bare }),

        Commands::Status => {
            let repo = Repo::find(&cli.repo)?;
            ops::status(&repo)
        }

        Commands::Log { r#ref } => {
            let repo = Repo::find(&cli.repo)?;
            let entries = ops::log(&repo, &r#ref)?;
            Ok(entries
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("\n"))
        }

        Commands::UpdateIndex { path, add, remove } => {
            let repo = Repo::find(&cli.repo)?;
            ops::update_index(&repo, &path, UpdateIndexOptions { add, remove })?;
            Ok(String::new())
        }

        Commands::UpdateRef {
            ref_to_update,
            ref_or_hash,
        } => {
            let repo = Repo::find(&cli.repo)?;
            ops::update_ref(&repo, &ref_to_update, &ref_or_hash)?;
            Ok(String::new())
        }
    }
}
