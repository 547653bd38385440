use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable overriding where the template document is read from
pub const TEMPLATE_ENV: &str = "NEWPROJECT_TEMPLATE";
/// Environment variable overriding the branch pushed to the remote
pub const BRANCH_ENV: &str = "NEWPROJECT_BRANCH";

/// Template looked for next to the executable
pub const TEMPLATE_FILE_NAME: &str = "template.blend";
pub const DEFAULT_EXTENSION: &str = "blend";
pub const DEFAULT_BRANCH: &str = "main";

/// Settings for a run, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub template_path: PathBuf,
    pub branch: String,
}

impl Config {
    /// Loads the config from the environment and any `.env` file in
    /// the current directory
    pub fn from_env() -> io::Result<Self> {
        dotenv::dotenv().ok();
        let exe = env::current_exe()?;
        let exe_dir = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::from_vars(exe_dir, |key| env::var(key).ok()))
    }

    /// Builds the config from a variable lookup, templates default to
    /// living in `exe_dir`
    pub fn from_vars(exe_dir: &Path, var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|value: &String| !value.trim().is_empty());
        let template_path = non_empty(TEMPLATE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| exe_dir.join(TEMPLATE_FILE_NAME));
        let branch = non_empty(BRANCH_ENV).unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        Self {
            template_path,
            branch,
        }
    }

    /// Extension of the template document, shared by every project file
    pub fn extension(&self) -> &str {
        self.template_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// Glob matching the numbered backups Blender writes next to a file
    pub fn backup_pattern(&self) -> String {
        format!("*.{}1", self.extension())
    }

    /// Glob of the files stored with git-lfs
    pub fn large_file_pattern(&self) -> String {
        format!("*.{}", self.extension())
    }
}
