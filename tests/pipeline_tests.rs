use chrono::NaiveDate;
use serde_json::json;
use sports_ratings::{
    analytics::AnalyticsEngine,
    config::{AnalyticsConfig, Config, HttpConfig, PredictionConfig, RatingsConfig, SourcesConfig},
    data_fetcher::SourceFetcher,
    ingest::Ingestor,
    prediction::{PredictionOutcome, PredictionService},
    ratings::{RatingAggregator, StoreRatingSource},
    store::{Favorite, GameFilter, RatingSystem, SqliteStore, Store},
    testing_utils::TestDataBuilder,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ELO_PAGE: &str = r#"
    <table class="ratings"><tbody>
      <tr><td>1</td><td>Ohio St.</td><td>1600</td></tr>
      <tr><td>2</td><td>Michigan Wolverines</td><td>1500</td></tr>
      <tr><td>3</td><td>Xavier</td><td>1400</td></tr>
    </tbody></table>"#;

const POWER_PAGE: &str = r#"
    <table class="ratings"><tbody>
      <tr><td>1</td><td>Ohio State</td><td>5.0</td></tr>
      <tr><td>2</td><td>Michigan</td><td>3.0</td></tr>
    </tbody></table>"#;

fn scoreboard_body() -> serde_json::Value {
    json!({ "events": [{
        "id": "401",
        "date": "2024-11-30T17:00Z",
        "season": { "year": 2024 },
        "week": { "number": 14 },
        "competitions": [{
            "status": { "type": { "completed": true } },
            "competitors": [
                { "homeAway": "home", "score": "24", "team": { "displayName": "Ohio State" } },
                { "homeAway": "away", "score": "13", "team": { "displayName": "Michigan" } }
            ]
        }]
    }]})
}

async fn mock_provider() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scoreboard"))
        .and(query_param("dates", "20241130"))
        .respond_with(ResponseTemplate::new(200).set_body_json(scoreboard_body()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ratings/elo"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ELO_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ratings/power"))
        .respond_with(ResponseTemplate::new(200).set_body_string(POWER_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cfb/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "header": { "id": "401" },
            "boxscore": { "teams": [
                { "homeAway": "home", "team": { "displayName": "Ohio State" },
                  "statistics": [{ "name": "totalYards", "displayValue": "452" }] },
                { "homeAway": "away", "team": { "displayName": "Michigan" },
                  "statistics": [{ "name": "totalYards", "displayValue": "301" }] }
            ]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cfb/linescore"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "teams": [
            { "homeAway": "home", "score": 24 },
            { "homeAway": "away", "score": 13 }
        ]})))
        .mount(&server)
        .await;
    server
}

fn sources(server: &MockServer) -> SourcesConfig {
    SourcesConfig {
        scoreboard_url: format!("{}/scoreboard", server.uri()),
        box_score_url: format!("{}/cfb", server.uri()),
        rankings_pages: BTreeMap::from([
            (RatingSystem::Elo, format!("{}/ratings/elo", server.uri())),
            (RatingSystem::PowerIndex, format!("{}/ratings/power", server.uri())),
        ]),
        ..SourcesConfig::default()
    }
}

/// Fetch, reconcile, store, rate, predict, grade and analyze one game
#[tokio::test]
async fn test_full_pipeline() {
    let server = mock_provider().await;
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let fetcher = SourceFetcher::new(&HttpConfig::default(), sources(&server)).unwrap();

    let aggregator = Arc::new(RatingAggregator::new(
        Arc::new(StoreRatingSource::new(store.clone())),
        &RatingsConfig::default(),
    ));
    let analytics = Arc::new(AnalyticsEngine::new(store.clone(), AnalyticsConfig::default()));

    let mut ingestor = Ingestor::new(store.clone(), Vec::new())
        .unwrap()
        .with_invalidator(aggregator.clone())
        .with_invalidator(analytics.clone());
    ingestor
        .import_teams(&[
            TestDataBuilder::team("Ohio State", &[]),
            TestDataBuilder::team("Michigan", &["Michigan Wolverines"]),
        ])
        .unwrap();

    // Scoreboard
    let date = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap();
    let records = fetcher.scoreboard(date).await.unwrap();
    let report = ingestor.ingest_scoreboard(&records).await;
    assert_eq!(report.upserted, 1);
    let game = store.games(&GameFilter::default()).unwrap().remove(0);

    // Rating tables: "Ohio St." resolves by normalization, the alias covers
    // Michigan, Xavier is reported for reconciliation
    let elo = fetcher.rankings(RatingSystem::Elo).await.unwrap();
    let report = ingestor
        .ingest_rankings(RatingSystem::Elo, 2024, Some(14), &elo)
        .await;
    assert_eq!(report.upserted, 2);
    assert_eq!(report.unresolved_names, vec!["Xavier"]);

    let power = fetcher.rankings(RatingSystem::PowerIndex).await.unwrap();
    ingestor
        .ingest_rankings(RatingSystem::PowerIndex, 2024, Some(14), &power)
        .await;

    // Two systems of five: pending, nothing written
    let predictions = PredictionService::new(
        store.clone(),
        aggregator.clone(),
        PredictionConfig::default(),
    );
    let outcome = predictions.generate(game.id).await.unwrap();
    assert!(matches!(outcome, PredictionOutcome::Pending { ref missing } if missing.len() == 3));
    assert!(store.prediction(game.id).unwrap().is_none());

    // Remaining systems arrive; the write evicts the cached bundle
    for team_id in [game.home_team_id, game.away_team_id] {
        for system in [
            RatingSystem::Ranking,
            RatingSystem::Efficiency,
            RatingSystem::StrengthOfSchedule,
        ] {
            let rows = vec![TestDataBuilder::ranking_row(
                &store.team(team_id).unwrap().unwrap().name,
                1,
                1.0,
            )];
            ingestor.ingest_rankings(system, 2024, Some(14), &rows).await;
        }
    }

    let outcome = predictions.generate(game.id).await.unwrap();
    let PredictionOutcome::Created { prediction } = outcome else {
        panic!("expected a prediction, got {outcome:?}");
    };
    assert_eq!(prediction.home_win_probability, 0.6266);
    assert_eq!(prediction.favored, Favorite::Home);
    // The scoreboard already reported the final
    assert_eq!(prediction.correct, Some(true));

    let summary = predictions.grade_season(2024).unwrap();
    assert_eq!(summary.correct, 1);

    // Box score feeds analytics
    let box_score = fetcher.box_score("401").await.unwrap();
    let report = ingestor.ingest_box_score(&box_score).await.unwrap();
    assert_eq!(report.upserted, 2);

    let team_analytics = analytics.analyze(game.home_team_id, None).await.unwrap();
    assert_eq!(team_analytics.games_analyzed, 1);
    let points = &team_analytics.metrics["points"];
    assert_eq!(points.games, 1);
    assert!(points.trend.is_insufficient());
}

#[tokio::test]
async fn test_new_stat_line_evicts_cached_analytics() {
    let (store, home, away, game) = TestDataBuilder::seeded_store().unwrap();
    let store = Arc::new(store);
    let analytics = Arc::new(AnalyticsEngine::new(store.clone(), AnalyticsConfig::default()));
    let ingestor = Ingestor::new(store.clone(), Vec::new())
        .unwrap()
        .with_invalidator(analytics.clone());

    let before = analytics.analyze(home, Some(3)).await.unwrap();
    assert_eq!(before.games_analyzed, 0);

    let stored = store.game(game).unwrap().unwrap();
    let mut record = sports_ratings::data_fetcher::models::BoxScoreRecord {
        date: Some(stored.game_date),
        ..Default::default()
    };
    record.home.team_name = Some("UGA".to_string());
    record.away.team_name = Some("Bama".to_string());
    record.home.metrics = BTreeMap::from([("points".to_string(), 31.0)]);
    record.away.metrics = BTreeMap::from([("points".to_string(), 17.0)]);

    let report = ingestor.ingest_box_score(&record).await.unwrap();
    assert_eq!(report.upserted, 2);
    assert_eq!(store.recent_stat_lines(away, 5).unwrap().len(), 1);

    let after = analytics.analyze(home, Some(3)).await.unwrap();
    assert_eq!(after.games_analyzed, 1);
}

#[tokio::test]
async fn test_config_defaults_wire_up() {
    let config = Config::default();
    config.validate().unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let ctx = sports_ratings::commands::AppContext::with_store(config, store).unwrap();
    assert!(ctx.ingestor().is_ok());
}
