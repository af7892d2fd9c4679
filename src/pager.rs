use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use console::Term;

use crate::debug;
use crate::errors::SilentExit;

/// Pick the pager command line from the value of `$PAGER`, or `None` when
/// output should go straight to stdout.
fn choose_pager<F>(pager: Option<String>, default_pager: F) -> Option<String>
where
    F: FnOnce() -> String,
{
    let cmdline = match pager {
        Some(pager) if !pager.trim().is_empty() => pager,
        _ => default_pager(),
    };
    if cmdline.trim() == "cat" {
        return None;
    }
    Some(cmdline)
}

fn default_pager() -> String {
    default_pager_in(env::var_os("PATH"))
}

fn default_pager_in(path: Option<OsString>) -> String {
    // Debian policy provides `pager`; `more` is in POSIX.
    let found = match env::current_dir() {
        Ok(cwd) => which::which_in("pager", path, cwd).is_ok(),
        Err(_) => false,
    };
    if found {
        return String::from("pager");
    }
    String::from("more")
}

/// Variables passed to the pager, skipping those the user already set.
fn pager_envs<F>(is_set: F) -> Vec<(&'static str, &'static str)>
where
    F: Fn(&str) -> bool,
{
    [("LESS", "FXR"), ("LV", "-c")]
        .into_iter()
        .filter(|(name, _)| !is_set(name))
        .collect()
}

/// Send what `write` produces through the user's pager when stdout is a
/// terminal, otherwise directly to stdout.
pub fn page<F>(enable: bool, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let cmdline = if enable && Term::stdout().is_term() {
        choose_pager(env::var("PAGER").ok(), default_pager)
    } else {
        None
    };
    let Some(cmdline) = cmdline else {
        let mut stdout = io::stdout().lock();
        return match write(&mut stdout) {
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => bail!(SilentExit { code: 1 }),
            result => result.context("write to stdout"),
        };
    };

    debug!("[pager] Use pager: {cmdline}");
    let mut cmd = Command::new("sh");
    cmd.args(["-c", cmdline.as_str()]).stdin(Stdio::piped());
    cmd.envs(pager_envs(|name| env::var_os(name).is_some()));

    let mut child = cmd
        .spawn()
        .with_context(|| format!("launch pager `{cmdline}`"))?;
    let result = match child.stdin.take() {
        Some(mut stdin) => write(&mut stdin),
        None => Ok(()),
    };
    child.wait().context("wait pager done")?;

    match result {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => bail!(SilentExit { code: 1 }),
        result => result.context("write to pager"),
    }
}
