use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::debug;
use crate::exec::Cmd;

/// Where the url of the current repository's remote comes from.
pub trait RemoteResolver {
    /// Return the url of the preferred remote, or `None` if the repository has
    /// no remote at all.
    fn remote_url(&self) -> Result<Option<String>>;
}

/// Reads remotes of the git repository in the current directory.
#[derive(Debug, Default)]
pub struct GitRemote;

impl RemoteResolver for GitRemote {
    fn remote_url(&self) -> Result<Option<String>> {
        let remotes = Cmd::git(&["remote"]).lines().context("list git remotes")?;
        debug!("[git] Remotes: {remotes:?}");

        let Some(name) = pick_remote(&remotes) else {
            return Ok(None);
        };

        let url = Cmd::git(&["remote", "get-url", name])
            .read()
            .with_context(|| format!("get url for remote {name}"))?;
        debug!("[git] Url of remote {name}: {url}");
        Ok(non_empty(url))
    }
}

/// `origin` when present, otherwise the first remote listed.
fn pick_remote(remotes: &[String]) -> Option<&str> {
    remotes
        .iter()
        .find(|name| name.as_str() == "origin")
        .or_else(|| remotes.first())
        .map(String::as_str)
}

fn non_empty(url: String) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    Some(url.to_string())
}

fn github_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:(?:https?|git|ssh)://(?:[^@/]+@)?github\.com(?::[0-9]+)?/|(?:[^@/]+@)?github\.com:)([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$",
        )
        .expect("parse github remote regex")
    })
}

/// Extract `(owner, repo)` from a GitHub clone url, in ssh or http form.
///
/// ```
/// parse_github_remote("git@github.com:jwilk/trava.git");
/// parse_github_remote("https://github.com/jwilk/trava");
/// ```
pub fn parse_github_remote(url: &str) -> Option<(String, String)> {
    let caps = github_regex().captures(url.trim())?;
    let owner = caps.get(1)?.as_str();
    let repo = caps.get(2)?.as_str();
    if repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}
