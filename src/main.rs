mod api;
mod cmd;
mod config;
mod debug;
mod errors;
mod exec;
mod format;
mod git;
mod pager;
mod present;
mod reference;
mod table;
mod utils;

use clap::Parser;

use crate::cmd::{App, Run};

fn main() {
    utils::handle_result(App::parse().run());
}
