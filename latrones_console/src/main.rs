#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

extern crate clap;
extern crate crossterm;
extern crate serde;
extern crate url;

extern crate latrones_client;

mod client_main;
mod config;
mod network;
mod terminal_view;
mod timer_queue;

use anyhow::anyhow;
use clap::{Command, arg};
use config::ConsoleConfig;


fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .filter_module("reqwest", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let matches = Command::new("Latrones")
        .version(clap::crate_version!())
        .about("Latrones console client")
        .subcommand_required(true)
        .subcommand(
            Command::new("play")
                .about("Play a game hosted by a Latrones server")
                .arg(arg!([server_address] "Server address, e.g. localhost:5000"))
                .arg(arg!(-c --config <config_file> "Path to a yaml-serialized ConsoleConfig")),
        )
        .subcommand(Command::new("default-config").about("Print the default configuration file"))
        .get_matches();

    match matches.subcommand() {
        Some(("play", sub_matches)) => {
            let console = match sub_matches.get_one::<String>("config") {
                Some(filename) => config::read_config_file(filename)?,
                None => ConsoleConfig::default(),
            };
            let server_address = sub_matches
                .get_one::<String>("server_address")
                .cloned()
                .or_else(|| console.server_address.clone())
                .ok_or_else(|| anyhow!("Server address is required"))?;
            client_main::run(client_main::ClientConfig { server_address, console })
        }
        Some(("default-config", _)) => {
            print!("{}", serde_yaml::to_string(&ConsoleConfig::default())?);
            Ok(())
        }
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}
