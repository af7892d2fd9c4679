use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;

use crate::api::travis::Travis;
use crate::api::{self, TravisApi};
use crate::config::Config;
use crate::debug::{self, Level};
use crate::git::{GitRemote, RemoteResolver};
use crate::pager;
use crate::present::{self, PresentOptions};
use crate::reference::Reference;

pub trait Run {
    fn run(&self) -> Result<()>;
}

/// Show Travis CI branches, builds and job logs.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct App {
    /// A Travis CI url, full or without the `https://travis-ci.org/` prefix:
    /// `owner/repo`, `owner/repo/builds/ID` or `owner/repo/jobs/ID`. Use `.`
    /// for the GitHub project of the current directory.
    #[arg(value_name = "URL")]
    pub url: String,

    /// Keep only the text after the last carriage return of each log line.
    #[arg(long)]
    pub clean_lf: bool,

    /// Write to stdout even when it is a terminal.
    #[arg(long)]
    pub no_pager: bool,

    /// Print debug logs to stderr.
    #[arg(long)]
    pub debug: bool,
}

impl Run for App {
    fn run(&self) -> Result<()> {
        if self.debug {
            debug::set_level(Level::Debug);
        }

        let cfg = Config::default();
        let travis = Travis::new(&cfg)?;
        let opts = PresentOptions {
            web_url: cfg.web_url.clone(),
            clean_lf: self.clean_lf,
        };

        let mut output = Vec::new();
        dispatch(&cfg, &self.url, &opts, &GitRemote, &travis, &mut output)?;
        pager::page(!self.no_pager, |w| w.write_all(&output))
    }
}

/// Run the whole pipeline for `arg` and write the result to `out`. Nothing is
/// written unless every step succeeded.
pub fn dispatch(
    cfg: &Config,
    arg: &str,
    opts: &PresentOptions,
    resolver: &dyn RemoteResolver,
    travis: &dyn TravisApi,
    out: &mut dyn Write,
) -> Result<()> {
    let reference = Reference::parse(cfg, arg, resolver)?;
    let payload = api::fetch(travis, &reference)?;
    let rendered = present::render(&reference, &payload, opts);
    rendered.write_to(out).context("write output")
}
