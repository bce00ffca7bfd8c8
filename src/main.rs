mod cli;
mod config;
mod logging;
mod orchestrator;
mod outside;
mod prompt;
mod reconciler;
mod result;
mod strip;
mod tagger;
mod track_numbers;
mod types;

use clap::Parser;
use miette::Context;
use tracing::{debug, info};

use crate::{
    cli::Args,
    config::RunConfig,
    logging::init_logging,
    orchestrator::{Orchestrator, Outcome},
    outside::{Ffmpeg, Ytdl},
    prompt::StdinOperator,
    tagger::LoftyTagger,
};

fn main() -> miette::Result<()> {
    // Initialize the environment & CLI
    let args = Args::parse();
    init_logging(args.log_level)?;

    let config = RunConfig::from_args(args)?;
    debug!("{config:?}");

    let ytdl = Ytdl::new().wrap_err("yt-dlp is required")?;
    let ffmpeg = Ffmpeg::new().wrap_err("ffmpeg is required")?;
    let mut operator = StdinOperator::new();

    let outcome = Orchestrator::new(&config, &ytdl, &ffmpeg, &LoftyTagger, &mut operator).run()?;

    match outcome {
        Outcome::Completed(report) => {
            println!("\n{report}\n");
            info!("All tasks completed");
        }
        Outcome::Declined => debug!("Nothing done"),
    }

    Ok(())
}
