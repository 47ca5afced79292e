use clap::{Arg, Command};
use epochledger_lib::commands;
use std::error::Error;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("epochledger")
        .about("Settles epochs of UTXO transactions.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log filter used when RUST_LOG is not set.")
                .takes_value(true)
                .global(true)
                .default_value("info"),
        )
        .subcommand(commands::keygen_command())
        .subcommand(commands::sign_command())
        .subcommand(commands::apply_command())
        .subcommand(commands::balances_command())
        .get_matches();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(matches.value_of("log-level").unwrap_or("info")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(matches) = matches.subcommand_matches("keygen") {
        commands::run_keygen_command(matches)
    } else if let Some(matches) = matches.subcommand_matches("sign") {
        commands::run_sign_command(matches)
    } else if let Some(matches) = matches.subcommand_matches("apply") {
        commands::run_apply_command(matches)
    } else if let Some(matches) = matches.subcommand_matches("balances") {
        commands::run_balances_command(matches)
    } else {
        Err("Unknown subcommand.".into())
    }
}
