use clap::error::ErrorKind;
use clap::Parser;
use derive_more::Display;

/// Commands listed in usage errors
pub const SUPPORTED_COMMANDS: &str = "Supported commands:\n  newproject <project-name>  Create a project from the template and push it to origin";

#[derive(Debug, Parser)]
#[command(name = "project-setup", version)]
#[command(about = "Creates a new Blender project with git and git-lfs set up")]
#[command(after_help = SUPPORTED_COMMANDS)]
pub struct Cli {
    /// Command to run (case-insensitive)
    pub command: Option<String>,

    /// Arguments for the command
    pub args: Vec<String>,

    /// Print log messages as they happen instead of only on failure
    #[arg(long)]
    pub verbose: bool,
}

/// Exit code for a failed parse. Help and version output are
/// successful runs, every other parse error is a usage failure
pub fn parse_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NewProject,
}

#[derive(Debug, Display, PartialEq, Eq)]
pub enum DispatchError {
    #[display(fmt = "No command given\n\n{}", SUPPORTED_COMMANDS)]
    Missing,
    #[display(fmt = "Unknown command '{}'\n\n{}", _0, SUPPORTED_COMMANDS)]
    Unknown(String),
}

impl Command {
    pub fn parse(name: Option<&str>) -> Result<Self, DispatchError> {
        let name = name.ok_or(DispatchError::Missing)?;
        match name.to_ascii_lowercase().as_str() {
            "newproject" => Ok(Command::NewProject),
            _ => Err(DispatchError::Unknown(name.to_string())),
        }
    }
}
