use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use reqwest::Url;

use crate::config::Config;
use crate::debug;
use crate::errors::TravaError;
use crate::git::{self, RemoteResolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Project,
    Build,
    Job,
}

/// What a reference points at inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Project,
    Build(String),
    Job(String),
}

/// The parsed command-line argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub resource: Resource,
}

impl Reference {
    pub fn kind(&self) -> ResourceKind {
        match self.resource {
            Resource::Project => ResourceKind::Project,
            Resource::Build(_) => ResourceKind::Build,
            Resource::Job(_) => ResourceKind::Job,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match &self.resource {
            Resource::Project => None,
            Resource::Build(id) | Resource::Job(id) => Some(id),
        }
    }

    /// `owner/repo`, the Travis "slug" of the project.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Parse a full or partial Travis CI url. The special value `.` means
    /// "the GitHub project of the current directory", which is looked up
    /// through `resolver`.
    pub fn parse(cfg: &Config, arg: &str, resolver: &dyn RemoteResolver) -> Result<Reference> {
        let arg = arg.trim();
        if arg == "." {
            let (owner, repo) = infer_repo(resolver)?;
            debug!("[reference] Inferred project {owner}/{repo} from git remote");
            return Ok(Reference {
                host: cfg.host.clone(),
                owner,
                repo,
                resource: Resource::Project,
            });
        }

        let url = resolve_url(cfg, arg)?;
        debug!("[reference] Resolved {arg:?} to url {url}");
        Self::from_path(cfg, url.path())
            .ok_or_else(|| invalid(format!("{arg:?} is not a project, build or job url")))
    }

    fn from_path(cfg: &Config, path: &str) -> Option<Reference> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let path = path.strip_suffix('/').unwrap_or(path);

        let caps = path_regex().captures(path)?;
        let owner = caps.name("owner")?.as_str().to_string();
        let repo = caps.name("repo")?.as_str().to_string();

        let id = caps.name("id").map(|m| m.as_str().to_string());
        let resource = match (caps.name("kind").map(|m| m.as_str()), id) {
            (None | Some("branches"), None) => Resource::Project,
            (Some("build" | "builds"), Some(id)) => Resource::Build(id),
            (Some("jobs"), Some(id)) => Resource::Job(id),
            _ => return None,
        };

        Some(Reference {
            host: cfg.host.clone(),
            owner,
            repo,
            resource,
        })
    }
}

fn path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<owner>[A-Za-z0-9_.-]+)/(?P<repo>[A-Za-z0-9_.-]+)(?:/(?P<kind>branches|builds?|jobs)(?:/(?P<id>[0-9]+))?)?$",
        )
        .expect("parse reference path regex")
    })
}

/// Join the argument onto the web base url, the way a browser resolves a
/// relative link, and check the result points at Travis.
fn resolve_url(cfg: &Config, arg: &str) -> Result<Url> {
    let bare_prefix = format!("{}/", cfg.host);
    let arg = match arg.strip_prefix(&bare_prefix) {
        Some(rest) => format!("https://{}/{rest}", cfg.host),
        None => arg.to_string(),
    };

    let base = format!("https://{}/", cfg.host);
    let base = Url::parse(&base).map_err(|e| invalid(format!("bad base url {base:?}: {e}")))?;
    let url = base
        .join(&arg)
        .map_err(|e| invalid(format!("cannot parse {arg:?} as url: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported url scheme {:?}", url.scheme())));
    }
    if url.host_str() != Some(cfg.host.as_str()) {
        return Err(invalid(format!(
            "unsupported host {:?}, only {} is supported",
            url.host_str().unwrap_or_default(),
            cfg.host
        )));
    }
    Ok(url)
}

fn infer_repo(resolver: &dyn RemoteResolver) -> Result<(String, String)> {
    let url = match resolver.remote_url() {
        Ok(Some(url)) => url,
        Ok(None) => {
            return Err(TravaError::NoRemoteFound(String::from(
                "the repository has no remote configured",
            ))
            .into())
        }
        Err(err) => return Err(TravaError::NoRemoteFound(format!("{err:#}")).into()),
    };

    match git::parse_github_remote(&url) {
        Some(names) => Ok(names),
        None => Err(TravaError::NoRemoteFound(format!("remote {url:?} is not a GitHub url")).into()),
    }
}

fn invalid(msg: String) -> anyhow::Error {
    TravaError::InvalidReference(msg).into()
}
