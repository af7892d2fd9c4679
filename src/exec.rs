use std::io::{self, Read};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

use crate::debug;

/// The captured result of a finished command.
pub struct CmdResult {
    /// The return code of the command.
    pub code: Option<i32>,

    pub stdout: String,
    pub stderr: String,

    /// The full command line, used in error messages.
    pub display: String,
}

impl CmdResult {
    /// Check the execution result of the command. If command exited with none-zero
    /// return an error.
    pub fn check(&self) -> Result<()> {
        if let Some(0) = self.code {
            return Ok(());
        }

        let code = match self.code {
            Some(code) => code.to_string(),
            None => String::from("<unknown>"),
        };

        let mut msg = format!("command `{}` exited with bad code {code}", self.display);
        if !self.stderr.is_empty() {
            msg.push_str(&format!(", stderr: '{}'", Self::trim_output(&self.stderr)));
        }

        bail!(msg)
    }

    /// Check result and return stdout output.
    pub fn read(&self) -> Result<String> {
        self.check()?;
        Ok(self.stdout.trim().to_string())
    }

    /// Check result and split stdout output to lines.
    pub fn lines(&self) -> Result<Vec<String>> {
        let output = self.read()?;
        let lines: Vec<String> = output
            .split('\n')
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                Some(line.to_string())
            })
            .collect();
        Ok(lines)
    }

    fn trim_output(s: &str) -> String {
        s.trim().replace('\n', "; ").replace('\'', "")
    }
}

/// A wrapper around [`Command`] that always pipes stdout and stderr, so that
/// a subprocess never writes into our own output.
///
/// # Examples
///
/// ```
/// Cmd::git(&["remote"]).lines().unwrap();
/// Cmd::git(&["remote", "get-url", "origin"]).read().unwrap();
/// ```
pub struct Cmd {
    cmd: Command,
}

impl Cmd {
    /// Create a new [`Cmd`], with args.
    pub fn with_args<S: AsRef<str>>(program: S, args: &[&str]) -> Cmd {
        let mut cmd = Command::new(program.as_ref());
        if !args.is_empty() {
            cmd.args(args);
        }

        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        Cmd { cmd }
    }

    /// Create a new git [`Cmd`].
    pub fn git(args: &[&str]) -> Cmd {
        Self::with_args("git", args)
    }

    /// Execute the command and return the output as multiple lines.
    /// See: [`CmdResult::lines`].
    pub fn lines(&mut self) -> Result<Vec<String>> {
        self.execute_unchecked()?.lines()
    }

    /// Execute the command and return the output as string. See: [`CmdResult::read`].
    pub fn read(&mut self) -> Result<String> {
        self.execute_unchecked()?.read()
    }

    /// Execute the command without performing result validation.
    pub fn execute_unchecked(&mut self) -> Result<CmdResult> {
        let display = self.full();
        debug!("[exec] Run command: {display}");

        let mut child = match self.cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                bail!(
                    "could not find command `{}`, please make sure it is installed",
                    self.get_name()
                );
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("could not launch command `{}`", self.get_name()))
            }
        };

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)
                .with_context(|| format!("read stdout from command `{}`", self.get_name()))?;
        }
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_string(&mut stderr)
                .with_context(|| format!("read stderr from command `{}`", self.get_name()))?;
        }

        let status = child.wait().context("wait command done")?;
        debug!("[exec] Command `{display}` exited with {:?}", status.code());
        Ok(CmdResult {
            code: status.code(),
            stdout,
            stderr,
            display,
        })
    }

    #[inline]
    fn full(&self) -> String {
        let mut cmd_args = vec![self.get_name().to_string()];
        for arg in self.cmd.get_args() {
            cmd_args.push(arg.to_string_lossy().into_owned());
        }
        cmd_args.join(" ")
    }

    #[inline]
    fn get_name(&self) -> &str {
        self.cmd.get_program().to_str().unwrap_or("<unknown>")
    }
}
