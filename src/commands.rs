use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{error, info};

use crate::analytics::AnalyticsEngine;
use crate::cli::{Args, Command, IngestSource};
use crate::config::Config;
use crate::data_fetcher::SourceFetcher;
use crate::error::AppError;
use crate::ingest::{IngestReport, Ingestor};
use crate::jobs::TaskQueue;
use crate::prediction::PredictionService;
use crate::ratings::{RatingAggregator, StoreRatingSource};
use crate::resolver::EntityResolver;
use crate::store::{GameId, NewTeam, SqliteStore, Store, TeamId};

/// Components wired from one configuration
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub fetcher: SourceFetcher,
    pub aggregator: Arc<RatingAggregator>,
    pub analytics: Arc<AnalyticsEngine>,
}

impl AppContext {
    pub fn open(config: Config) -> Result<Self, AppError> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(config.db_path())?);
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn Store>) -> Result<Self, AppError> {
        let fetcher = SourceFetcher::new(&config.http, config.sources.clone())?;
        let aggregator = Arc::new(RatingAggregator::new(
            Arc::new(StoreRatingSource::new(store.clone())),
            &config.ratings,
        ));
        let analytics = Arc::new(AnalyticsEngine::new(store.clone(), config.analytics.clone()));
        Ok(Self {
            config,
            store,
            fetcher,
            aggregator,
            analytics,
        })
    }

    /// Ingestor wired to evict the rating and analytics caches
    pub fn ingestor(&self) -> Result<Ingestor, AppError> {
        Ok(Ingestor::new(self.store.clone(), self.config.seasons.clone())?
            .with_invalidator(self.aggregator.clone())
            .with_invalidator(self.analytics.clone()))
    }

    pub fn predictions(&self) -> PredictionService {
        PredictionService::new(
            self.store.clone(),
            self.aggregator.clone(),
            self.config.prediction.clone(),
        )
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(raw: Option<&str>) -> Result<NaiveDate, AppError> {
    match raw {
        None => Ok(Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| {
            AppError::datetime_parse_error(format!("Invalid date '{raw}', expected YYYY-MM-DD: {e}"))
        }),
    }
}

/// Accepts a numeric team id or any name the resolver understands
fn resolve_team(store: &dyn Store, raw: &str) -> Result<TeamId, AppError> {
    if let Ok(id) = raw.trim().parse::<i64>() {
        return Ok(TeamId(id));
    }
    EntityResolver::from_store(store)?
        .resolve(raw)
        .team_id()
        .ok_or_else(|| AppError::unresolved_team(raw))
}

#[derive(Clone)]
struct IngestShared {
    ingestor: Arc<Ingestor>,
    fetcher: SourceFetcher,
    report: Arc<Mutex<IngestReport>>,
}

/// Queues one fetch-and-ingest unit. Its report is merged into the shared
/// total once it succeeds.
async fn enqueue_ingest<F, Fut>(
    queue: &TaskQueue,
    name: String,
    shared: &IngestShared,
    work: F,
) -> Result<(), AppError>
where
    F: Fn(IngestShared) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<IngestReport, AppError>> + Send + 'static,
{
    let shared = shared.clone();
    queue
        .enqueue(name, move || {
            let pending = work(shared.clone());
            let total = shared.report.clone();
            async move {
                let report = pending.await?;
                total
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .merge(report);
                Ok(())
            }
        })
        .await
}

/// Runs an ingest subcommand on the task queue and returns the combined report.
pub async fn handle_ingest_command(
    ctx: &AppContext,
    source: &IngestSource,
) -> Result<IngestReport, AppError> {
    let shared = IngestShared {
        ingestor: Arc::new(ctx.ingestor()?),
        fetcher: ctx.fetcher.clone(),
        report: Arc::new(Mutex::new(IngestReport::default())),
    };

    let queue = TaskQueue::new(ctx.config.jobs.clone());
    let failed_jobs = Arc::new(AtomicUsize::new(0));
    let counter = failed_jobs.clone();
    queue.on_failure(move |failure| {
        error!(
            "Ingest job '{}' gave up after {} attempts: {}",
            failure.name, failure.attempts, failure.error
        );
        counter.fetch_add(1, Ordering::Relaxed);
    });

    match source.clone() {
        IngestSource::Scoreboard { date } => {
            let date = parse_date(date.as_deref())?;
            enqueue_ingest(&queue, format!("scoreboard:{date}"), &shared, move |s| async move {
                let records = s.fetcher.scoreboard(date).await?;
                Ok(s.ingestor.ingest_scoreboard(&records).await)
            })
            .await?;
        }
        IngestSource::Rankings {
            system,
            season,
            week,
        } => {
            enqueue_ingest(&queue, format!("rankings:{system}"), &shared, move |s| async move {
                let records = s.fetcher.rankings(system).await?;
                Ok(s.ingestor.ingest_rankings(system, season, week, &records).await)
            })
            .await?;
        }
        IngestSource::RatingsApi { season, week } => {
            enqueue_ingest(&queue, format!("ratings_api:{season}"), &shared, move |s| async move {
                let records = s.fetcher.ratings_api(season).await?;
                Ok(s.ingestor.ingest_advanced_ratings(season, week, &records).await)
            })
            .await?;
        }
        IngestSource::Schedule => {
            enqueue_ingest(&queue, "schedule".to_string(), &shared, |s| async move {
                let records = s.fetcher.schedule().await?;
                Ok(s.ingestor.ingest_schedule(&records).await)
            })
            .await?;
        }
        IngestSource::BoxScore { event_ids } => {
            for event_id in event_ids {
                let name = format!("box_score:{event_id}");
                enqueue_ingest(&queue, name, &shared, move |s| {
                    let event_id = event_id.clone();
                    async move {
                        let record = s.fetcher.box_score(&event_id).await?;
                        s.ingestor.ingest_box_score(&record).await
                    }
                })
                .await?;
            }
        }
    }

    let stats = queue.shutdown().await;
    let report = shared
        .report
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();

    let failed = failed_jobs.load(Ordering::Relaxed);
    if failed > 0 && stats.succeeded == 0 {
        return Err(AppError::job_failed(
            "ingest",
            format!("all {failed} ingest jobs failed"),
        ));
    }
    if !report.unresolved_names.is_empty() {
        info!(
            target: "reconciliation",
            "{} unresolved team names need aliases: {:?}",
            report.unresolved_names.len(),
            report.unresolved_names
        );
    }
    Ok(report)
}

/// Reads a JSON array of teams and upserts them with their aliases
pub async fn handle_import_teams_command(
    ctx: &AppContext,
    file: &str,
) -> Result<IngestReport, AppError> {
    let content = tokio::fs::read_to_string(file).await?;
    let teams: Vec<NewTeam> = serde_json::from_str(&content)?;
    ctx.ingestor()?.import_teams(&teams)
}

/// Dispatches the parsed subcommand
pub async fn run(args: &Args, config: Config) -> Result<(), AppError> {
    if let Command::Config { save } = args.command {
        println!("{}", config.display()?);
        if save {
            config.save().await?;
            info!("Configuration saved to {}", Config::get_config_path());
        }
        return Ok(());
    }

    let ctx = AppContext::open(config)?;
    match &args.command {
        Command::ImportTeams { file } => print_json(&handle_import_teams_command(&ctx, file).await?),
        Command::Ingest { source } => print_json(&handle_ingest_command(&ctx, source).await?),
        Command::Predict { game_id } => {
            print_json(&ctx.predictions().generate(GameId(*game_id)).await?)
        }
        Command::Grade { season } => print_json(&ctx.predictions().grade_season(*season)?),
        Command::Ratings { game_id } => {
            print_json(&ctx.aggregator.get_ratings(GameId(*game_id)).await?)
        }
        Command::Analyze { team, window } => {
            let team_id = resolve_team(ctx.store.as_ref(), team)?;
            print_json(&ctx.analytics.analyze(team_id, *window).await?)
        }
        Command::Config { .. } => Ok(()),
    }
}
