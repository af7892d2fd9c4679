use std::io::Write;
use std::process;

use anyhow::{Error, Result};
use console::style;

use crate::errors::{self, SilentExit};

pub fn error_exit(err: Error) {
    let code = errors::exit_code(&err);
    if err.downcast_ref::<SilentExit>().is_none() {
        _ = writeln!(
            std::io::stderr(),
            "{}: {err:#}",
            style("error").red().for_stderr()
        );
    }
    process::exit(code);
}

pub fn handle_result(result: Result<()>) {
    if let Err(err) = result {
        error_exit(err);
    }
}
