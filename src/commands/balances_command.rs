use crate::snapshot::read_json;
use crate::{PublicKey, UtxoPool};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;

struct BalancesCliOptions {
    pool: PathBuf,
}

impl BalancesCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            pool: super::required_path(matches, "pool")?,
        })
    }
}

pub fn balances_command() -> Command<'static> {
    Command::new("balances")
        .version("0.1")
        .about("Prints the balance of every owner in a UTXO pool snapshot.")
        .arg(
            Arg::new("pool")
                .long("pool")
                .value_name("FILE")
                .help("JSON snapshot of the UTXO pool.")
                .takes_value(true)
                .required(true),
        )
}

pub fn run_balances_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = BalancesCliOptions::parse(matches)?;
    let pool: UtxoPool = read_json(&options.pool)?;
    let overflow = || format!("Balance of an owner overflows in: {}", options.pool.display());
    let mut balances = pool
        .balances()
        .ok_or_else(overflow)?
        // Sort by amount in non-increasing order.
        .into_iter()
        .collect::<Vec<(PublicKey, i64)>>();
    balances.sort_by(|(_, lhs), (_, rhs)| rhs.cmp(lhs));
    for (public_key, balance) in balances {
        println!("{}: {}", public_key, balance);
    }
    Ok(())
}
