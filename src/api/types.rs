use std::fmt::{self, Display, Formatter};

use serde::Deserialize;
use serde_json::{Map, Value};

/// State of a Travis build or job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Created,
    Received,
    Queued,
    Started,
    Passed,
    Failed,
    Errored,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Received => "received",
            Self::Queued => "queued",
            Self::Started => "started",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Errored => "errored",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response of `GET /repos/{owner}/{repo}/branches`: the latest build of every
/// branch, with the commits they were built from listed separately.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Branches {
    #[serde(default)]
    pub branches: Vec<BranchBuild>,

    #[serde(default)]
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BranchBuild {
    pub id: u64,
    pub number: String,
    pub state: State,
    pub commit_id: u64,

    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Commit {
    pub id: u64,
    pub branch: String,

    #[serde(default)]
    pub sha: String,
}

/// Response of `GET /repos/{owner}/{repo}/builds/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuildDetail {
    pub build: Build,

    pub commit: Option<Commit>,

    #[serde(default)]
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Build {
    pub id: u64,
    pub number: String,
    pub state: State,

    pub duration: Option<u64>,
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Job {
    pub id: u64,
    pub number: String,
    pub state: State,

    #[serde(default)]
    pub config: Map<String, Value>,

    pub finished_at: Option<String>,

    #[serde(default)]
    pub allow_failure: bool,
}

/// The decoded answer for one reference, one variant per resource kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Project(Branches),
    Build(BuildDetail),
    Job(Vec<u8>),
}
