use image_matcher::app::{self, Outcome};
use image_matcher::args::Args;
use image_matcher::logging::{self, LOG_FILE};
use image_matcher::{DesktopScreen, SearchConfig};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    // Usage errors print and leave, before the log file is touched
    let args = match Args::parse() {
        Ok(args) => args,
        Err(e) => {
            println!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _log = logging::init(Path::new(LOG_FILE));
    log::info!("Received template path: {}", args.template.display());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("Failed to start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(app::run_until_interrupted(lookup(&args), interrupted()));
    // A correlation still running on the blocking pool is abandoned, not awaited
    runtime.shutdown_background();
    outcome.exit_code()
}

async fn lookup(args: &Args) -> Outcome {
    let config = SearchConfig::default();

    let screen = match DesktopScreen::connect(config.safety.clone()).await {
        Ok(screen) => screen,
        Err(e) => {
            log::error!("Screen capture unavailable: {}", e.into_environment());
            return Outcome::Failed;
        }
    };

    let mut stdout = std::io::stdout().lock();
    app::run(&screen, &args.template, config, Path::new("."), &mut stdout).await
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
