pub mod travis;
pub mod types;

use anyhow::Result;

use crate::debug;
use crate::reference::{Reference, Resource};

pub use types::{Branches, BuildDetail, Payload};

/// The read-only part of the Travis CI REST API this tool needs.
pub trait TravisApi {
    /// Latest build of every branch of a project.
    fn branches(&self, owner: &str, repo: &str) -> Result<Branches>;

    /// One build, together with its jobs.
    fn build(&self, owner: &str, repo: &str, id: &str) -> Result<BuildDetail>;

    /// The log of a job, as the raw bytes Travis stored.
    fn job_log(&self, id: &str) -> Result<Vec<u8>>;
}

/// Issue the one request that answers `reference`.
pub fn fetch(api: &dyn TravisApi, reference: &Reference) -> Result<Payload> {
    debug!(
        "[api] Fetch {:?} {:?} of {}",
        reference.kind(),
        reference.id(),
        reference.slug()
    );
    let payload = match &reference.resource {
        Resource::Project => Payload::Project(api.branches(&reference.owner, &reference.repo)?),
        Resource::Build(id) => Payload::Build(api.build(&reference.owner, &reference.repo, id)?),
        Resource::Job(id) => Payload::Job(api.job_log(id)?),
    };
    Ok(payload)
}
