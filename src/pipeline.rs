use crate::diagnostics::RunLog;
use crate::fs::{copy_template, create_project_directory, write_ignore_file, IGNORE_FILE};
use crate::git::{VcsError, VersionControl, ATTRIBUTES_FILE};
use crate::SetupContext;
use derive_more::{Display, From};
use std::io;
use std::iter;
use std::path::{Path, PathBuf};

/// Message of the first commit in every project
pub const COMMIT_MESSAGE: &str = "Initial commit";
/// Remote the first commit is pushed to
pub const REMOTE: &str = "origin";

#[derive(Debug, From, Display)]
pub enum SetupError {
    #[from(ignore)]
    #[display(fmt = "Expected exactly one project name but got {} arguments. Usage: newproject <project-name>", _0)]
    Usage(usize),
    #[from(ignore)]
    #[display(fmt = "'{}' is not a valid project name, it must not be empty, '.', '..' or contain path separators", _0)]
    InvalidName(String),
    #[from(ignore)]
    #[display(fmt = "Directory {} already exists", "_0.display()")]
    DirectoryExists(PathBuf),
    #[from(ignore)]
    #[display(fmt = "Template {} does not exist", "_0.display()")]
    TemplateMissing(PathBuf),
    #[display(fmt = "IO Error occurred while setting up the project: {}", _0)]
    IO(io::Error),
    #[display(fmt = "{}", _0)]
    Vcs(VcsError),
}

type SetupResult<T> = Result<T, SetupError>;

/// Steps of the setup in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum Step {
    #[display(fmt = "Validating arguments")]
    ValidateArguments,
    #[display(fmt = "{}", _0)]
    Setup(SetupStep),
}

impl Step {
    pub fn all() -> impl Iterator<Item = Step> {
        iter::once(Step::ValidateArguments).chain(SetupStep::ALL.into_iter().map(Step::Setup))
    }
}

/// Steps that run once the arguments name a valid project
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display)]
pub enum SetupStep {
    #[display(fmt = "Creating project directory")]
    CreateDirectory,
    #[display(fmt = "Copying template")]
    CopyTemplate,
    #[display(fmt = "Initializing git repository")]
    InitRepository,
    #[display(fmt = "Writing ignore file")]
    WriteIgnoreFile,
    #[display(fmt = "Tracking large files with git-lfs")]
    TrackLargeFiles,
    #[display(fmt = "Staging files")]
    StageFiles,
    #[display(fmt = "Committing")]
    Commit,
    #[display(fmt = "Pushing to remote")]
    Push,
}

impl SetupStep {
    pub const ALL: [SetupStep; 8] = [
        SetupStep::CreateDirectory,
        SetupStep::CopyTemplate,
        SetupStep::InitRepository,
        SetupStep::WriteIgnoreFile,
        SetupStep::TrackLargeFiles,
        SetupStep::StageFiles,
        SetupStep::Commit,
        SetupStep::Push,
    ];
}

/// The project being created, known once the arguments are validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub dir: PathBuf,
    /// File name of the document copied from the template
    pub document: String,
}

impl Project {
    fn from_args(root_path: &Path, args: &[String], extension: &str) -> SetupResult<Self> {
        let [name] = args else {
            return Err(SetupError::Usage(args.len()));
        };
        if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
            return Err(SetupError::InvalidName(name.clone()));
        }
        Ok(Self {
            name: name.clone(),
            dir: root_path.join(name),
            document: format!("{name}.{extension}"),
        })
    }
}

#[derive(Debug)]
pub struct StepFailure {
    pub step: Step,
    pub error: SetupError,
}

/// Result of a run. Failure is final, a report with a failure never
/// has any step after the failed one executed
#[derive(Debug)]
pub struct SetupReport {
    pub project: Option<Project>,
    pub failure: Option<StepFailure>,
}

impl SetupReport {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs the setup steps in order stopping at the first one that fails.
/// Completed steps are never rolled back
pub struct SetupPipeline<'a, V> {
    context: SetupContext<'a>,
    vcs: &'a V,
}

impl<'a, V> SetupPipeline<'a, V>
where
    V: VersionControl,
{
    pub fn new(context: SetupContext<'a>, vcs: &'a V) -> Self {
        Self { context, vcs }
    }

    pub async fn run(&self, args: &[String], log: &mut RunLog) -> SetupReport {
        log.info(Step::ValidateArguments);
        let project = match Project::from_args(self.context.root_path, args, self.context.config.extension()) {
            Ok(project) => project,
            Err(error) => return self.fail(None, Step::ValidateArguments, error, log),
        };
        log.info(format!("Creating project '{}' at {}", project.name, project.dir.display()));

        for step in SetupStep::ALL {
            log.info(step);
            let result = self.execute(step, &project, log).await;
            if let Err(error) = result {
                return self.fail(Some(project), Step::Setup(step), error, log);
            }
        }

        log.info(format!("Project '{}' is set up", project.name));
        SetupReport {
            project: Some(project),
            failure: None,
        }
    }

    async fn execute(&self, step: SetupStep, project: &Project, log: &mut RunLog) -> SetupResult<()> {
        let config = self.context.config;
        let dir = project.dir.as_path();
        match step {
            SetupStep::CreateDirectory => {
                if dir.exists() {
                    return Err(SetupError::DirectoryExists(dir.to_path_buf()));
                }
                create_project_directory(dir).await.map_err(|err| match err.kind() {
                    io::ErrorKind::AlreadyExists => SetupError::DirectoryExists(dir.to_path_buf()),
                    _ => SetupError::IO(err),
                })?;
            }
            SetupStep::CopyTemplate => {
                let template = config.template_path.as_path();
                if !template.is_file() {
                    return Err(SetupError::TemplateMissing(template.to_path_buf()));
                }
                let bytes = copy_template(template, dir.join(&project.document)).await?;
                log.info(format!("Copied {} ({bytes} bytes) to {}", template.display(), project.document));
            }
            SetupStep::InitRepository => self.vcs.init(dir, log).await?,
            SetupStep::WriteIgnoreFile => {
                let pattern = config.backup_pattern();
                write_ignore_file(dir, &pattern).await?;
                log.info(format!("Ignoring {pattern}"));
            }
            SetupStep::TrackLargeFiles => {
                self.vcs
                    .track_large_files(dir, &config.large_file_pattern(), log)
                    .await?
            }
            SetupStep::StageFiles => {
                let paths = [project.document.as_str(), ATTRIBUTES_FILE, IGNORE_FILE];
                self.vcs.add(dir, &paths, log).await?
            }
            SetupStep::Commit => self.vcs.commit(dir, COMMIT_MESSAGE, log).await?,
            SetupStep::Push => self.vcs.push(dir, REMOTE, &config.branch, log).await?,
        }
        Ok(())
    }

    fn fail(&self, project: Option<Project>, step: Step, error: SetupError, log: &mut RunLog) -> SetupReport {
        log.error(format!("{step} failed: {error}"));

        if let Some(project) = &project {
            let dir = project.dir.display();
            if step == Step::Setup(SetupStep::Push) {
                let branch = &self.context.config.branch;
                let fix = match &error {
                    SetupError::Vcs(VcsError::MissingRemote(_)) => {
                        format!("add the remote with `git remote add {REMOTE} <url>`")
                    }
                    _ => format!(
                        "check the remote is reachable or point it elsewhere with \
                         `git remote set-url {REMOTE} <url>`"
                    ),
                };
                log.error(format!(
                    "From inside {dir} {fix} then push with `git push -u {REMOTE} {branch}`"
                ));
            }
            if step > Step::Setup(SetupStep::CreateDirectory) {
                log.warn(format!(
                    "The partially set up project was left at {dir}, finish the remaining steps \
                     by hand or delete it and run again"
                ));
            }
        }

        SetupReport {
            project,
            failure: Some(StepFailure { step, error }),
        }
    }
}
