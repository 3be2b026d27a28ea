use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod attach;

#[derive(Parser)]
#[command(name = "symprop")]
#[command(about = "KiCad symbol library property tools", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Attach properties to every symbol in a .kicad_sym library
    #[command(alias = "a")]
    Attach(attach::AttachArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default log level depends on --debug; RUST_LOG overrides either way
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Attach(args) => attach::execute(args),
    }
}
