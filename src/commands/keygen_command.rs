use crate::KeyPair;
use clap::{ArgMatches, Command};
use std::error::Error;

pub fn keygen_command() -> Command<'static> {
    Command::new("keygen")
        .version("0.1")
        .about("Generates a new Ed25519 key pair and prints it as hex.")
}

pub fn run_keygen_command(_matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let key_pair = KeyPair::generate();
    println!("secret key: {}", key_pair.secret_hex());
    println!("public key: {}", key_pair.public_key());
    Ok(())
}
