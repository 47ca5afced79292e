use crate::snapshot::{read_json, write_json};
use crate::{KeyPair, UnsignedTransaction};
use clap::{Arg, ArgMatches, Command};
use std::error::Error;
use std::path::PathBuf;
use tracing::info;

struct SignCliOptions {
    transaction: PathBuf,
    keys: Vec<String>,
    output: PathBuf,
}

impl SignCliOptions {
    pub fn parse(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            transaction: super::required_path(matches, "transaction")?,
            keys: matches
                .values_of("keys")
                .map(|values| values.map(str::to_string).collect())
                .unwrap_or_default(),
            output: super::required_path(matches, "output")?,
        })
    }
}

pub fn sign_command() -> Command<'static> {
    Command::new("sign")
        .version("0.1")
        .about("Signs every input of an unsigned transaction.")
        .arg(
            Arg::new("transaction")
                .long("transaction")
                .value_name("FILE")
                .help("JSON file with the unsigned transaction: claimed UTXOs and outputs.")
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("keys")
                .long("keys")
                .value_name("[SECRET_KEY...]")
                .help("Hex-encoded secret keys, one per input, in input order.")
                .takes_value(true)
                .multiple_occurrences(true)
                .use_value_delimiter(true)
                .required(false),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .help("File to write the signed transaction to.")
                .takes_value(true)
                .required(true),
        )
}

pub fn run_sign_command(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let options = SignCliOptions::parse(matches)?;
    let unsigned: UnsignedTransaction = read_json(&options.transaction)?;
    let key_pairs = options
        .keys
        .iter()
        .map(|key| KeyPair::from_secret_hex(key))
        .collect::<Result<Vec<KeyPair>, _>>()?;
    let transaction = unsigned.sign(&key_pairs.iter().collect::<Vec<&KeyPair>>())?;
    write_json(&options.output, &transaction)?;
    info!(
        "Signed transaction: {} written to: {}",
        transaction.id(),
        options.output.display()
    );
    println!("{}", transaction.id());
    Ok(())
}
