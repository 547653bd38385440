use std::path::Path;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod diagnostics;
pub(crate) mod fs;
pub mod git;
pub mod pipeline;

use config::Config;
use diagnostics::RunLog;
use git::GitCli;
use pipeline::{SetupPipeline, SetupReport};

/// Where a run happens and the settings it uses
#[derive(Debug, Clone, Copy)]
pub struct SetupContext<'a> {
    /// Directory the project directory is created inside
    pub root_path: &'a Path,
    pub config: &'a Config,
}

/// Creates a new project from `args` using the git command line tools
pub async fn new_project(context: SetupContext<'_>, args: &[String], log: &mut RunLog) -> SetupReport {
    SetupPipeline::new(context, &GitCli).run(args, log).await
}
