use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};

mod commands;

use commands::config::ConfigArgs;
use commands::run::RunArgs;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run    [OPTIONS] "<code>"        # Run Brainfuck code (args are concatenated)
  {0} run    [OPTIONS] --file <PATH>   # Run Brainfuck code streamed from a file
  {0} config [--sample|--path]         # Show resolved settings or a sample bf.toml

Run "{0} <subcommand> --help" for more info.
Set RUST_LOG=debug to see tape growth and loop resolution.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bf", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Config(ConfigArgs),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bf"));

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => commands::run::run(&program, args),
        Command::Config(args) => commands::config::run(&program, args),
    };

    std::process::exit(code);
}
