use crate::cli::actions::Action;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        providers: matches
            .get_one::<PathBuf>("providers")
            .cloned()
            .context("missing required argument: --providers")?,
    })
}
