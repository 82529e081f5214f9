use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use thiserror::Error;
use tokio::time;

use vote_page::{
    api::HttpVoteApi,
    clock::SystemClock,
    model::{Identity, VotingPeriodState},
    page::SubmitOutcome,
    surface::TerminalSurface,
    Config, VotePage,
};

/// Errors that are critical to the whole program.
#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Page(#[from] vote_page::Error),
    #[error("{0:?} is not a candidate you can choose in this vote")]
    NotSelectable(String),
    #[error("Vote was not cast ({0:?})")]
    NotCast(SubmitOutcome),
}

/// Show a vote, follow its countdown, and optionally cast a vote.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Code of the vote to open.
    code: String,

    /// Email address of the signed-in user.
    #[arg(long)]
    email: String,

    /// Backend API base URL; overrides the config file.
    #[arg(long)]
    api_url: Option<String>,

    /// Config file.
    #[arg(long, default_value = vote_page::config::CONFIG_FILE)]
    config: PathBuf,

    /// log4rs config file.
    #[arg(long, default_value = "log4rs.yaml")]
    log_config: PathBuf,

    /// Also log the HTTP client's internals.
    #[arg(short, long)]
    verbose: bool,

    /// Cast a vote for this candidate.
    #[arg(long)]
    vote: Option<String>,

    /// Keep redrawing the page until voting ends.
    #[arg(long, conflicts_with = "vote")]
    watch: bool,
}

async fn run(args: Args) -> Result<(), Error> {
    let mut config = Config::load(&args.config)?;
    if let Some(api_url) = args.api_url {
        config = config.with_api_url(api_url);
    }
    info!("Using backend at {}", config.api_url());

    let tick = config.tick();
    let api = HttpVoteApi::new(&config)?;
    let surface = Arc::new(TerminalSurface::default());
    let page = VotePage::mount(
        args.code,
        Identity::from_email(args.email),
        config,
        Arc::new(api),
        surface.clone(),
        Arc::new(SystemClock),
    );
    page.settle().await;
    if surface.navigated_home() {
        // Nothing to show; the vote does not exist.
        return Ok(());
    }
    let has_window = page.vote().and_then(|vote| vote.window()).is_some();
    if has_window && page.status() == VotingPeriodState::Loading {
        // Give the ticker its first evaluation before drawing.
        let _ = page
            .subscribe()
            .wait_for(|state| *state != VotingPeriodState::Loading)
            .await;
    }
    print!("{}", page.view());

    if let Some(candidate) = args.vote {
        if !page.select(&candidate) {
            return Err(Error::NotSelectable(candidate));
        }
        return match page.submit().await {
            SubmitOutcome::Submitted => Ok(()),
            outcome => Err(Error::NotCast(outcome)),
        };
    }

    if args.watch {
        let mut interval = time::interval(tick);
        loop {
            interval.tick().await;
            let view = page.view();
            println!();
            print!("{view}");
            if view.status.is_terminal() || surface.navigated_home() {
                break;
            }
        }
    }

    page.unmount();
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Set up logging.
    vote_page::logging::init(&args.log_config, args.verbose)
        .expect("Failed to initialise logging");

    if let Err(err) = run(args).await {
        error!("{err}");
        std::process::exit(1)
    }
}
