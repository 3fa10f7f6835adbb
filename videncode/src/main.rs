use std::process::ExitCode;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use videncode::{Args, Transcoder, cli, logging};

fn main() -> ExitCode {
    if std::env::args_os().len() < 2 {
        if let Err(e) = Args::command().print_help() {
            eprintln!("failed to print usage: {e}");
        }
        return ExitCode::SUCCESS;
    }

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if let Err(print) = e.print() {
                eprintln!("{e}: {print}");
            }
            return ExitCode::from(cli::parse_exit_status(&e));
        }
    };
    logging::init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::from(cli::EXIT_FAILURE)
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let job = args.into_job()?;

    let mut transcoder = Transcoder::open(&job).context("Failed to initialize encoder")?;

    let settings = transcoder.settings();
    println!("\n");
    println!("width   = {}", settings.width);
    println!("height  = {}", settings.height);
    println!("crf     = {:.6}", settings.crf);
    println!("bitrate = {}", settings.bitrate);
    println!("x264 preset = {}", settings.preset);
    println!("\n");

    let result = transcoder.run();
    println!();
    println!("{}", transcoder.summary());

    result.context("Transcode failed")?;
    Ok(())
}
