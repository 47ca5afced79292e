pub mod apply_command;
pub mod balances_command;
pub mod keygen_command;
pub mod sign_command;

pub use self::{apply_command::*, balances_command::*, keygen_command::*, sign_command::*};

use clap::ArgMatches;
use std::error::Error;
use std::path::PathBuf;

fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf, Box<dyn Error>> {
    matches
        .value_of(name)
        .map(PathBuf::from)
        .ok_or_else(|| format!("Missing required argument: {}", name).into())
}
