use crate::snapshot::{read_json, write_json};
use crate::{Ledger, Outcome, Transaction, UtxoPool};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

struct ApplyCliOptions {
    pool: PathBuf,
    batch: PathBuf,
    output: Option<PathBuf>,
}

impl ApplyCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            pool: super::required_path(matches, "pool")?,
            batch: super::required_path(matches, "batch")?,
            output: matches.value_of("output").map(PathBuf::from),
        })
    }
}

pub fn apply_command() -> Command<'static> {
    Command::new("apply")
        .version("0.1")
        .about("Settles one epoch: applies a batch of transactions to a UTXO pool snapshot.")
        .arg(
            Arg::new("pool")
                .long("pool")
                .value_name("FILE")
                .help("JSON snapshot of the UTXO pool the batch is settled against.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("JSON list of candidate transactions, in processing order.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .help("File to write the resulting UTXO pool snapshot to.")
                .takes_value(true)
                .required(false),
        )
}

pub fn run_apply_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = ApplyCliOptions::parse(matches)?;
    let pool: UtxoPool = read_json(&options.pool)?;
    let batch: Vec<Transaction> = read_json(&options.batch)?;
    info!(
        "Loaded {} unspent outputs and {} candidate transactions",
        pool.len(),
        batch.len()
    );

    let mut ledger = Ledger::new(&pool);
    let outcomes = ledger.settle_epoch(&batch);
    for (transaction, outcome) in batch.iter().zip(&outcomes) {
        match outcome {
            Outcome::Accepted => println!("{}: accepted", transaction.id()),
            Outcome::Duplicate => println!("{}: duplicate", transaction.id()),
            Outcome::Rejected(rejection) => {
                println!("{}: rejected: {}", transaction.id(), rejection)
            }
        }
    }
    let accepted = outcomes
        .iter()
        .filter(|outcome| **outcome == Outcome::Accepted)
        .count();
    println!("Accepted {} of {} transactions", accepted, batch.len());

    if let Some(output) = &options.output {
        write_json(output, ledger.pool())?;
        info!("UTXO pool written to: {}", output.display());
    }
    Ok(())
}
