use anyhow::{Context, Result};
use reqwest::blocking::{Client, Request, Response};
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::debug;
use crate::errors::TravaError;

use super::{Branches, BuildDetail, TravisApi};

/// Blocking client for the Travis CI v2 REST API.
pub struct Travis {
    client: Client,

    url: String,

    user_agent: String,
}

impl TravisApi for Travis {
    fn branches(&self, owner: &str, repo: &str) -> Result<Branches> {
        let path = format!("repos/{owner}/{repo}/branches");
        self.execute_get(&path)
            .with_context(|| format!("get branches of {owner}/{repo}"))
    }

    fn build(&self, owner: &str, repo: &str, id: &str) -> Result<BuildDetail> {
        let path = format!("repos/{owner}/{repo}/builds/{id}");
        self.execute_get(&path)
            .with_context(|| format!("get build {id} of {owner}/{repo}"))
    }

    fn job_log(&self, id: &str) -> Result<Vec<u8>> {
        let path = format!("jobs/{id}/log.txt");
        let req = self.build_request(&path, None)?;
        let resp = self.execute_resp(req)?;
        let data = resp.bytes().context("read Travis job log response body")?;
        Ok(data.to_vec())
    }
}

impl Travis {
    const ACCEPT_JSON: &'static str = "application/vnd.travis-ci.2+json";

    pub fn new(cfg: &Config) -> Result<Travis> {
        let client = Client::builder()
            .timeout(cfg.timeout)
            .build()
            .context("build Travis http client")?;
        Ok(Travis {
            client,
            url: cfg.api_url.clone(),
            user_agent: cfg.user_agent.clone(),
        })
    }

    fn execute_get<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let req = self.build_request(path, Some(Self::ACCEPT_JSON))?;
        let resp = self.execute_resp(req)?;
        let data = resp.bytes().context("read Travis response body")?;
        serde_json::from_slice(&data).context("decode Travis response data")
    }

    fn execute_resp(&self, req: Request) -> Result<Response> {
        let url = req.url().to_string();
        debug!("[travis] GET {url}");
        let resp = match self.client.execute(req) {
            Ok(resp) => resp,
            Err(source) => return Err(TravaError::Network { url, source }.into()),
        };

        let status = resp.status();
        debug!("[travis] Response status: {status}");
        if status.is_success() {
            return Ok(resp);
        }

        let data = resp.bytes().context("read Travis error response body")?;
        let body = String::from_utf8_lossy(&data).into_owned();
        Err(TravaError::Api {
            status: status.as_u16(),
            body,
        }
        .into())
    }

    fn build_request(&self, path: &str, accept: Option<&str>) -> Result<Request> {
        let url = format!("{}/{path}", self.url);
        let url = Url::parse(url.as_str()).with_context(|| format!("parse Travis url {url}"))?;
        let mut builder = self
            .client
            .request(Method::GET, url)
            .header(USER_AGENT, &self.user_agent);
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }

        builder.build().context("build Travis request")
    }
}
