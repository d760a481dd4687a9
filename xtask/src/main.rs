//! See <https://github.com/matklad/cargo-xtask/>
//!
//! This binary defines various auxiliary build commands, which are not
//! expressible with just `cargo`.
//!
//! The binary is integrated into the `cargo` command line by using an
//! alias in `.cargo/config`.
use clap::{Args, Parser, Subcommand};
use duct::cmd;
use std::error::Error;

#[derive(Debug, Parser)]
#[command(name = "xtasks")]
#[command(about = "Run project tasks using rust instead of scripts")]
pub struct App {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Re-run the CLI demo on every source change.
    Watch(WatchArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = App::parse();

    match cli.command {
        Some(command) => match command {
            Commands::Watch(args) => watch(args),
        },
        None => {
            println!("No command specified.");
            std::process::exit(1);
        }
    }
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Extra arguments forwarded to `vellum-cli`, e.g. "show".
    #[clap(default_value = "show")]
    cli_args: String,
}

pub fn watch(args: WatchArgs) -> Result<(), Box<dyn Error>> {
    let run_cmd = format!("run --bin vellum-cli -- {}", args.cli_args);
    let arguments = vec!["-x", run_cmd.as_str(), "-L", "info", "-C", "demos/vellum-cli"];

    bunt::println!(
        "{$magenta}Watching vellum-cli, args: {[bold]}...{/$}",
        args.cli_args
    );
    cmd("cargo", arguments).read()?;

    Ok(())
}
