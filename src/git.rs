use crate::cmd::{run_command, run_command_format, CommandError};
use crate::diagnostics::RunLog;
use derive_more::{Display, From};
use git2::{ErrorCode, Repository};
use std::path::Path;

#[derive(Debug, From, Display)]
pub enum VcsError {
    #[display(fmt = "Unable to execute git command: {}", _0)]
    CommandError(CommandError),
    #[display(fmt = "Unable to read repository: {}", _0)]
    Git(git2::Error),
    #[from(ignore)]
    #[display(fmt = "'{}' is not installed", _0)]
    ToolMissing(&'static str),
    #[from(ignore)]
    #[display(fmt = "No remote named '{}' is configured", _0)]
    MissingRemote(String),
}

pub type VcsResult<T> = Result<T, VcsError>;

/// Name of the file git-lfs writes tracked patterns to
pub const ATTRIBUTES_FILE: &str = ".gitattributes";

/// The version control operations needed to set up a project. Each
/// operation runs inside `dir` and records its output into `log`
#[allow(async_fn_in_trait)]
pub trait VersionControl {
    async fn init(&self, dir: &Path, log: &mut RunLog) -> VcsResult<()>;

    async fn track_large_files(&self, dir: &Path, pattern: &str, log: &mut RunLog) -> VcsResult<()>;

    async fn add(&self, dir: &Path, paths: &[&str], log: &mut RunLog) -> VcsResult<()>;

    async fn commit(&self, dir: &Path, message: &str, log: &mut RunLog) -> VcsResult<()>;

    /// Pushes `branch` to `remote` setting it as the upstream
    async fn push(&self, dir: &Path, remote: &str, branch: &str, log: &mut RunLog) -> VcsResult<()>;
}

/// Version control through the `git` and `git lfs` command line tools
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

const GIT: &str = "git";
const GIT_LFS: &str = "git lfs";
const NOT_A_GIT_COMMAND: &str = "is not a git command";

/// Maps a git failure where git itself couldn't be found or where
/// git didn't know the subcommand into a missing tool error
fn map_missing(err: CommandError, tool: &'static str) -> VcsError {
    match err {
        CommandError::NotFound(_) => VcsError::ToolMissing(tool),
        CommandError::NoZeroExitCode { ref stderr, .. }
            if stderr.iter().any(|line| line.contains(NOT_A_GIT_COMMAND)) =>
        {
            VcsError::ToolMissing(tool)
        }
        err => VcsError::CommandError(err),
    }
}

impl VersionControl for GitCli {
    async fn init(&self, dir: &Path, log: &mut RunLog) -> VcsResult<()> {
        run_command_format(dir, "git init", &[], log)
            .await
            .map_err(|err| map_missing(err, GIT))
    }

    async fn track_large_files(&self, dir: &Path, pattern: &str, log: &mut RunLog) -> VcsResult<()> {
        run_command_format(dir, "git lfs track {0}", &[pattern], log)
            .await
            .map_err(|err| map_missing(err, GIT_LFS))
    }

    async fn add(&self, dir: &Path, paths: &[&str], log: &mut RunLog) -> VcsResult<()> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        run_command(dir, GIT, &args, log)
            .await
            .map_err(|err| map_missing(err, GIT))
    }

    async fn commit(&self, dir: &Path, message: &str, log: &mut RunLog) -> VcsResult<()> {
        run_command_format(dir, "git commit -m {0}", &[message], log)
            .await
            .map_err(|err| map_missing(err, GIT))
    }

    async fn push(&self, dir: &Path, remote: &str, branch: &str, log: &mut RunLog) -> VcsResult<()> {
        if !has_remote(dir, remote)? {
            return Err(VcsError::MissingRemote(remote.to_string()));
        }
        // Fresh repositories use whatever `init.defaultBranch` says
        // so the branch is renamed first
        run_command_format(dir, "git branch -M {0}", &[branch], log)
            .await
            .map_err(|err| map_missing(err, GIT))?;
        run_command_format(dir, "git push -u {0} {1}", &[remote, branch], log)
            .await
            .map_err(|err| map_missing(err, GIT))
    }
}

/// Checks whether the repository at `dir` has a remote called `name`,
/// including remotes that come from the global or system config
fn has_remote(dir: &Path, name: &str) -> VcsResult<bool> {
    let repo = Repository::open(dir)?;
    let found = match repo.find_remote(name) {
        Ok(_) => true,
        Err(err) if err.code() == ErrorCode::NotFound => false,
        Err(err) => return Err(err.into()),
    };
    Ok(found)
}
