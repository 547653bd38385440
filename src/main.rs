use clap::Parser;
use log::error;
use project_setup::cli::{parse_exit_code, Cli, Command};
use project_setup::config::Config;
use project_setup::diagnostics::{finalize, init_logger, LogMode, RunLog};
use project_setup::{new_project, SetupContext};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            err.print().ok();
            return ExitCode::from(parse_exit_code(&err));
        }
    };
    let mode = if cli.verbose {
        LogMode::Verbose
    } else {
        LogMode::Quiet
    };
    init_logger(mode);

    let command = match Command::parse(cli.command.as_deref()) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let root_path = match std::env::current_dir() {
        Ok(path) => path,
        Err(err) => {
            error!("Unable to resolve the working directory: {err}");
            return ExitCode::FAILURE;
        }
    };
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Unable to load config: {err}");
            return ExitCode::FAILURE;
        }
    };
    let context = SetupContext {
        root_path: &root_path,
        config: &config,
    };

    let mut log = RunLog::new(mode);
    let report = match command {
        Command::NewProject => new_project(context, &cli.args, &mut log).await,
    };

    match finalize(&log, report.succeeded(), &root_path).await {
        Ok(Some(path)) => println!("Setup failed, see {} for details", path.display()),
        Ok(None) if mode == LogMode::Quiet && report.succeeded() => {
            if let Some(project) = &report.project {
                println!("Project {} created", project.name);
            }
        }
        Ok(None) => {}
        Err(err) => {
            // The buffered lines would otherwise be lost
            error!("Unable to write diagnostics: {err}");
            for line in log.lines() {
                eprintln!("{line}");
            }
        }
    }

    if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
