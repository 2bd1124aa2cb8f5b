use clap::Parser;
use dcatrader::cli::{init_logging, run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("warning: logging disabled: {e}");
    }
    run(cli)
}
