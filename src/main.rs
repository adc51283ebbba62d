use clap::Parser;
use console::style;
use intro_trimmer::cli::Cli;
use intro_trimmer::config::RunConfig;
use intro_trimmer::error::TrimError;
use intro_trimmer::handlers::run_with_ffmpeg;
use intro_trimmer::init;
use intro_trimmer::signal::setup_shutdown_signal;
use log::{error, info};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init::init(cli.log_file.as_deref()) {
        eprintln!("{} {e:#}", style("錯誤:").red().bold());
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => {
            info!("Program exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            let code = e.downcast_ref::<TrimError>().map_or(1, TrimError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RunConfig::from_cli(cli)?;
    let shutdown_signal = setup_shutdown_signal()?;
    run_with_ffmpeg(&config, &shutdown_signal)
}
