use clap::Parser;
use sports_ratings::cli::Args;
use sports_ratings::commands;
use sports_ratings::config::Config;
use sports_ratings::error::AppError;
use sports_ratings::logging::setup_logging;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let args = Args::parse();
    let config = Config::load(args.config_path.as_deref()).await?;

    // The guard must be kept alive for the duration of the program
    // to ensure logs are flushed properly
    let (log_file_path, _guard) = setup_logging(&args, &config).await?;
    tracing::debug!("Logging to {log_file_path}");

    commands::run(&args, config).await.inspect_err(|e| {
        if e.is_not_found() {
            tracing::warn!("{e}");
        } else {
            tracing::error!("{e}");
        }
    })
}
