use crate::diagnostics::RunLog;
use derive_more::{Display, From};
use std::future::poll_fn;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::task::Poll;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::process::Command;
use tokio::select;

#[derive(Debug, From, Display)]
pub enum CommandError {
    #[display(fmt = "IO Error occurred while executing command: {}", _0)]
    IO(io::Error),
    #[display(fmt = "Provided command string didn't contain a command. (Was it empty?)")]
    MissingCommand,
    #[from(ignore)]
    #[display(fmt = "Unable to find '{}', is it installed and on the PATH?", _0)]
    NotFound(String),
    #[from(ignore)]
    #[display(fmt = "Process exited with non-zero exit code: Code {}", code)]
    NoZeroExitCode { code: i32, stderr: Vec<String> },
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Executes the provided command in the provided working directory
/// in this case the command is a format string which can contain
/// format arguments (i.e. {0} {1}) these variables are provided in
/// the `args_in` slice. A format argument always becomes exactly one
/// process argument even when its value contains whitespace
pub async fn run_command_format(
    working_dir: impl AsRef<Path>,
    command: &str,
    args_in: &[&str],
    log: &mut RunLog,
) -> CommandResult<()> {
    let (cmd, args) = split_command(command).ok_or(CommandError::MissingCommand)?;
    let args = transform_args(args, args_in);
    run_command(working_dir, cmd, &args, log).await
}

/// Executes `program` with `args` in the working directory recording
/// all of its output into the run log
pub async fn run_command(
    working_dir: impl AsRef<Path>,
    program: &str,
    args: &[&str],
    log: &mut RunLog,
) -> CommandResult<()> {
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(working_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    // Git output is matched against english messages
    command.env("LC_ALL", "C");

    log.info(format!("> {} {}", program, args.join(" ")));

    let (exit_status, stderr) = match pipe_and_wait(command, log).await {
        Ok(value) => value,
        Err(CommandError::IO(err)) if err.kind() == io::ErrorKind::NotFound => {
            return Err(CommandError::NotFound(program.to_string()))
        }
        Err(err) => return Err(err),
    };

    let code = exit_status.code().unwrap_or(-1);
    if code != 0 {
        return Err(CommandError::NoZeroExitCode { code, stderr });
    }

    Ok(())
}

struct OptionalReader<V> {
    child: Option<Lines<BufReader<V>>>,
}

impl<V> OptionalReader<V>
where
    V: Unpin + AsyncRead,
{
    fn new(value: Option<V>) -> Self {
        Self {
            child: value.map(|value| BufReader::new(value).lines()),
        }
    }

    fn is_open(&self) -> bool {
        self.child.is_some()
    }

    async fn next_line(&mut self) -> io::Result<Option<String>> {
        if let Some(child) = &mut self.child {
            let line = child.next_line().await?;
            if line.is_none() {
                self.child = None;
            }
            return Ok(line);
        }
        // Never resolve if no child
        poll_fn(|_| Poll::Pending).await
    }
}

/// Spawns the command child piping its output into the run log and
/// waiting until the process exits returning the exit status of the
/// program along with everything it wrote to stderr
async fn pipe_and_wait(
    mut command: Command,
    log: &mut RunLog,
) -> CommandResult<(ExitStatus, Vec<String>)> {
    let mut child = command.spawn()?;

    let mut stdout = OptionalReader::new(child.stdout.take());
    let mut stderr = OptionalReader::new(child.stderr.take());
    let mut stderr_lines = Vec::new();

    loop {
        select! {
            result = stdout.next_line(), if stdout.is_open() => {
                if let Some(line) = result? {
                    log.info(line);
                }
            }
            result = stderr.next_line(), if stderr.is_open() => {
                if let Some(line) = result? {
                    // Git reports progress on stderr so these are not errors
                    log.warn(&line);
                    stderr_lines.push(line);
                }
            }
            else => break,
        }
    }

    let status = child.wait().await?;
    Ok((status, stderr_lines))
}

/// Splits the command into the command itself and a vector
/// containing the additional arguments
fn split_command(value: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = value.split_whitespace();
    let command = parts.next()?;
    let args = parts.collect::<Vec<&str>>();
    Some((command, args))
}

/// Transforms the provided `args` formatting them replacing their
/// values with those stored in the `args_in` slice
fn transform_args<'a: 'b, 'b>(args: Vec<&'a str>, args_in: &'a [&str]) -> Vec<&'b str> {
    /// Parses a format value from the provided `value` returning
    /// the index stored inside it or None if the value isn't
    /// entirely a format (i.e. {0})
    fn parse_format(value: &str) -> Option<usize> {
        let format = value.strip_prefix('{')?.strip_suffix('}')?;
        format.parse::<usize>().ok()
    }

    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        if let Some(index) = parse_format(arg) {
            if let Some(value) = args_in.get(index) {
                out.push(*value);
                continue;
            }
        }
        out.push(arg)
    }
    out
}
