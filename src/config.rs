use std::time::Duration;

/// Built-in settings for talking to Travis CI. There is no config file: the
/// tool only reads public data from one fixed host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The web host accepted in references, e.g. `travis-ci.org`.
    pub host: String,

    /// The web base url, used to print links to builds and jobs.
    pub web_url: String,

    /// The REST API base url, without trailing slash.
    pub api_url: String,

    pub user_agent: String,

    pub timeout: Duration,
}

impl Config {
    pub const HOST: &'static str = "travis-ci.org";
    pub const API_URL: &'static str = "https://api.travis-ci.org";
    pub const USER_AGENT: &'static str = "trava (https://github.com/jwilk/trava)";
    pub const TIMEOUT_SECS: u64 = 30;

    /// Point the API client at another base url, keeping everything else.
    pub fn with_api_url(mut self, url: impl AsRef<str>) -> Self {
        self.api_url = url.as_ref().trim_end_matches('/').to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: String::from(Self::HOST),
            web_url: format!("https://{}", Self::HOST),
            api_url: String::from(Self::API_URL),
            user_agent: String::from(Self::USER_AGENT),
            timeout: Duration::from_secs(Self::TIMEOUT_SECS),
        }
    }
}
