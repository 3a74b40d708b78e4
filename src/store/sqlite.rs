use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use super::Store;
use super::models::{
    Alias, Favorite, Game, GameFilter, GameId, GameUpsert, HypotheticalPrediction, NewTeam,
    RatingFilter, RatingSnapshot, RatingSystem, RecentGameStatLine, Team, TeamId,
};
use crate::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Week column value for a season-level rating snapshot
const SEASON_LEVEL_WEEK: i64 = -1;

const TEAM_COLUMNS: &str =
    "id, name, abbreviation, conference, division, color, alt_color, logo_url";
const GAME_COLUMNS: &str = "id, external_id, season, week, game_date, home_team_id, away_team_id, \
     home_score, away_score, completed, venue";
const RATING_COLUMNS: &str =
    "team_id, system, season, week, value, offense, defense, rank, extra_json";
const PREDICTION_COLUMNS: &str = "p.game_id, p.home_team_id, p.away_team_id, p.home_rating_a, \
     p.away_rating_a, p.home_rating_b, p.away_rating_b, p.home_win_probability, p.spread, \
     p.favored, p.favored_team_id, p.correct, p.created_at, p.updated_at";

/// SQLite-backed [`Store`]. A single connection guarded by a mutex; every
/// operation is a short statement or transaction.
///
/// Calls are synchronous and block the calling thread, tokio workers
/// included, while they hold the lock. That is fine for the CLI's small
/// worker pool. If the task queue grows to many concurrent writers, wrap
/// store calls in `tokio::task::spawn_blocking`.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!("Opened SQLite store at {}", path.display());
        Self::with_connection(conn)
    }

    /// Fresh private in-memory database.
    pub fn open_in_memory() -> Result<Self, AppError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AppError> {
        match conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        }) {
            Ok(mode) => debug!("SQLite journal mode: {mode}"),
            Err(e) => warn!("Could not enable WAL journal mode: {e}"),
        }
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn init_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL COLLATE NOCASE UNIQUE,
            abbreviation TEXT,
            conference TEXT,
            division TEXT,
            color TEXT,
            alt_color TEXT,
            logo_url TEXT
        );

        CREATE TABLE IF NOT EXISTS team_aliases (
            alias TEXT NOT NULL COLLATE NOCASE,
            source TEXT NOT NULL DEFAULT '',
            team_id INTEGER NOT NULL REFERENCES teams(id),
            PRIMARY KEY (alias, source)
        );

        CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            external_id TEXT,
            season INTEGER NOT NULL,
            week INTEGER,
            game_date TEXT NOT NULL,
            home_team_id INTEGER NOT NULL REFERENCES teams(id),
            away_team_id INTEGER NOT NULL REFERENCES teams(id),
            home_score INTEGER,
            away_score INTEGER,
            completed INTEGER,
            venue TEXT,
            UNIQUE (home_team_id, away_team_id, game_date)
        );

        CREATE INDEX IF NOT EXISTS idx_games_season_week ON games(season, week);
        CREATE INDEX IF NOT EXISTS idx_games_external_id ON games(external_id);

        CREATE TABLE IF NOT EXISTS rating_snapshots (
            team_id INTEGER NOT NULL REFERENCES teams(id),
            system TEXT NOT NULL,
            season INTEGER NOT NULL,
            week INTEGER NOT NULL,
            value REAL NOT NULL,
            offense REAL,
            defense REAL,
            rank INTEGER,
            extra_json TEXT,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (team_id, system, season, week)
        );

        CREATE TABLE IF NOT EXISTS stat_lines (
            team_id INTEGER NOT NULL REFERENCES teams(id),
            game_id INTEGER NOT NULL REFERENCES games(id),
            game_date TEXT NOT NULL,
            opponent_team_id INTEGER,
            metrics_json TEXT NOT NULL,
            PRIMARY KEY (team_id, game_id)
        );

        CREATE INDEX IF NOT EXISTS idx_stat_lines_team_date ON stat_lines(team_id, game_date);

        CREATE TABLE IF NOT EXISTS predictions (
            game_id INTEGER PRIMARY KEY REFERENCES games(id),
            home_team_id INTEGER NOT NULL,
            away_team_id INTEGER NOT NULL,
            home_rating_a REAL NOT NULL,
            away_rating_a REAL NOT NULL,
            home_rating_b REAL NOT NULL,
            away_rating_b REAL NOT NULL,
            home_win_probability REAL NOT NULL,
            spread REAL NOT NULL,
            favored TEXT NOT NULL,
            favored_team_id INTEGER,
            correct INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn get_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: TeamId(row.get(0)?),
        name: row.get(1)?,
        abbreviation: row.get(2)?,
        conference: row.get(3)?,
        division: row.get(4)?,
        color: row.get(5)?,
        alt_color: row.get(6)?,
        logo_url: row.get(7)?,
    })
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: GameId(row.get(0)?),
        external_id: row.get(1)?,
        season: row.get(2)?,
        week: row.get(3)?,
        game_date: get_date(row, 4)?,
        home_team_id: TeamId(row.get(5)?),
        away_team_id: TeamId(row.get(6)?),
        home_score: row.get(7)?,
        away_score: row.get(8)?,
        completed: row.get::<_, Option<bool>>(9)?.unwrap_or(false),
        venue: row.get(10)?,
    })
}

fn rating_from_row(row: &Row<'_>) -> rusqlite::Result<RatingSnapshot> {
    let system: String = row.get(1)?;
    let week: i64 = row.get(3)?;
    let extra: Option<String> = row.get(8)?;
    Ok(RatingSnapshot {
        team_id: TeamId(row.get(0)?),
        system: system.parse().map_err(|e: String| conversion_error(1, e))?,
        season: row.get(2)?,
        week: if week == SEASON_LEVEL_WEEK {
            None
        } else {
            u32::try_from(week).ok()
        },
        value: row.get(4)?,
        offense: row.get(5)?,
        defense: row.get(6)?,
        rank: row.get(7)?,
        extra: extra
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| conversion_error(8, e))?,
    })
}

fn stat_line_from_row(row: &Row<'_>) -> rusqlite::Result<RecentGameStatLine> {
    let metrics: String = row.get(4)?;
    Ok(RecentGameStatLine {
        team_id: TeamId(row.get(0)?),
        game_id: GameId(row.get(1)?),
        game_date: get_date(row, 2)?,
        opponent_team_id: row.get::<_, Option<i64>>(3)?.map(TeamId),
        metrics: serde_json::from_str(&metrics).map_err(|e| conversion_error(4, e))?,
    })
}

fn prediction_from_row(row: &Row<'_>) -> rusqlite::Result<HypotheticalPrediction> {
    let favored: String = row.get(9)?;
    Ok(HypotheticalPrediction {
        game_id: GameId(row.get(0)?),
        home_team_id: TeamId(row.get(1)?),
        away_team_id: TeamId(row.get(2)?),
        home_rating_a: row.get(3)?,
        away_rating_a: row.get(4)?,
        home_rating_b: row.get(5)?,
        away_rating_b: row.get(6)?,
        home_win_probability: row.get(7)?,
        spread: row.get(8)?,
        favored: favored
            .parse::<Favorite>()
            .map_err(|e| conversion_error(9, e))?,
        favored_team_id: row.get::<_, Option<i64>>(10)?.map(TeamId),
        correct: row.get(11)?,
        created_at: get_timestamp(row, 12)?,
        updated_at: get_timestamp(row, 13)?,
    })
}

impl Store for SqliteStore {
    fn upsert_team(&self, team: &NewTeam) -> Result<TeamId, AppError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let id: i64 = tx.query_row(
            "INSERT INTO teams (name, abbreviation, conference, division, color, alt_color, logo_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(name) DO UPDATE SET
                abbreviation = COALESCE(excluded.abbreviation, teams.abbreviation),
                conference = COALESCE(excluded.conference, teams.conference),
                division = COALESCE(excluded.division, teams.division),
                color = COALESCE(excluded.color, teams.color),
                alt_color = COALESCE(excluded.alt_color, teams.alt_color),
                logo_url = COALESCE(excluded.logo_url, teams.logo_url)
             RETURNING id",
            params![
                team.name.trim(),
                team.abbreviation,
                team.conference,
                team.division,
                team.color,
                team.alt_color,
                team.logo_url
            ],
            |row| row.get(0),
        )?;

        for alias in &team.aliases {
            tx.execute(
                "INSERT INTO team_aliases (alias, source, team_id) VALUES (?1, '', ?2)
                 ON CONFLICT(alias, source) DO UPDATE SET team_id = excluded.team_id",
                params![alias.trim(), id],
            )?;
        }

        tx.commit()?;
        Ok(TeamId(id))
    }

    fn team(&self, id: TeamId) -> Result<Option<Team>, AppError> {
        let conn = self.conn();
        let team = conn
            .query_row(
                &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE id = ?1"),
                params![id.0],
                team_from_row,
            )
            .optional()?;
        Ok(team)
    }

    fn teams(&self) -> Result<Vec<Team>, AppError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY id"))?;
        let teams = stmt
            .query_map([], team_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    fn upsert_alias(&self, alias: &Alias) -> Result<(), AppError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO team_aliases (alias, source, team_id) VALUES (?1, ?2, ?3)
             ON CONFLICT(alias, source) DO UPDATE SET team_id = excluded.team_id",
            params![alias.alias.trim(), alias.source, alias.team_id.0],
        )?;
        Ok(())
    }

    fn aliases(&self) -> Result<Vec<Alias>, AppError> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT team_id, alias, source FROM team_aliases ORDER BY team_id, alias")?;
        let aliases = stmt
            .query_map([], |row| {
                Ok(Alias {
                    team_id: TeamId(row.get(0)?),
                    alias: row.get(1)?,
                    source: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(aliases)
    }

    fn upsert_game(&self, game: &GameUpsert) -> Result<GameId, AppError> {
        let conn = self.conn();
        let id: i64 = conn.query_row(
            "INSERT INTO games (external_id, season, week, game_date, home_team_id, away_team_id,
                                home_score, away_score, completed, venue)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(home_team_id, away_team_id, game_date) DO UPDATE SET
                external_id = COALESCE(excluded.external_id, games.external_id),
                season = excluded.season,
                week = COALESCE(excluded.week, games.week),
                home_score = COALESCE(excluded.home_score, games.home_score),
                away_score = COALESCE(excluded.away_score, games.away_score),
                completed = COALESCE(excluded.completed, games.completed),
                venue = COALESCE(excluded.venue, games.venue)
             RETURNING id",
            params![
                game.external_id,
                game.season,
                game.week,
                format_date(game.game_date),
                game.home_team_id.0,
                game.away_team_id.0,
                game.home_score,
                game.away_score,
                game.completed,
                game.venue
            ],
            |row| row.get(0),
        )?;
        debug!(
            "Upserted game {id}: {} vs {} on {}",
            game.away_team_id, game.home_team_id, game.game_date
        );
        Ok(GameId(id))
    }

    fn game(&self, id: GameId) -> Result<Option<Game>, AppError> {
        let conn = self.conn();
        let game = conn
            .query_row(
                &format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"),
                params![id.0],
                game_from_row,
            )
            .optional()?;
        Ok(game)
    }

    fn game_by_external_id(&self, external_id: &str) -> Result<Option<Game>, AppError> {
        let conn = self.conn();
        let game = conn
            .query_row(
                &format!(
                    "SELECT {GAME_COLUMNS} FROM games WHERE external_id = ?1 ORDER BY id LIMIT 1"
                ),
                params![external_id],
                game_from_row,
            )
            .optional()?;
        Ok(game)
    }

    fn games(&self, filter: &GameFilter) -> Result<Vec<Game>, AppError> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(season) = filter.season {
            clauses.push("season = ?");
            values.push(Value::Integer(season.into()));
        }
        if let Some(week) = filter.week {
            clauses.push("week = ?");
            values.push(Value::Integer(week.into()));
        }
        if let Some(from) = filter.from {
            clauses.push("game_date >= ?");
            values.push(Value::Text(format_date(from)));
        }
        if let Some(to) = filter.to {
            clauses.push("game_date <= ?");
            values.push(Value::Text(format_date(to)));
        }
        if let Some(team_id) = filter.team_id {
            clauses.push("(home_team_id = ? OR away_team_id = ?)");
            values.push(Value::Integer(team_id.0));
            values.push(Value::Integer(team_id.0));
        }
        if let Some(completed) = filter.completed {
            clauses.push("COALESCE(completed, 0) = ?");
            values.push(Value::Integer(completed.into()));
        }

        let mut sql = format!("SELECT {GAME_COLUMNS} FROM games");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY game_date, id");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let games = stmt
            .query_map(params_from_iter(values.iter()), game_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(games)
    }

    fn upsert_rating(&self, snapshot: &RatingSnapshot) -> Result<(), AppError> {
        let week = snapshot.week.map_or(SEASON_LEVEL_WEEK, i64::from);
        let extra = snapshot
            .extra
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let conn = self.conn();
        conn.execute(
            "INSERT INTO rating_snapshots (team_id, system, season, week, value, offense, defense,
                                           rank, extra_json, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(team_id, system, season, week) DO UPDATE SET
                value = excluded.value,
                offense = COALESCE(excluded.offense, rating_snapshots.offense),
                defense = COALESCE(excluded.defense, rating_snapshots.defense),
                rank = COALESCE(excluded.rank, rating_snapshots.rank),
                extra_json = COALESCE(excluded.extra_json, rating_snapshots.extra_json),
                updated_at = excluded.updated_at",
            params![
                snapshot.team_id.0,
                snapshot.system.as_str(),
                snapshot.season,
                week,
                snapshot.value,
                snapshot.offense,
                snapshot.defense,
                snapshot.rank,
                extra,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn latest_rating(
        &self,
        team_id: TeamId,
        system: RatingSystem,
        season: i32,
    ) -> Result<Option<RatingSnapshot>, AppError> {
        let conn = self.conn();
        let snapshot = conn
            .query_row(
                &format!(
                    "SELECT {RATING_COLUMNS} FROM rating_snapshots
                     WHERE team_id = ?1 AND system = ?2 AND season = ?3
                     ORDER BY week DESC LIMIT 1"
                ),
                params![team_id.0, system.as_str(), season],
                rating_from_row,
            )
            .optional()?;
        Ok(snapshot)
    }

    fn ratings(&self, filter: &RatingFilter) -> Result<Vec<RatingSnapshot>, AppError> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(team_id) = filter.team_id {
            clauses.push("team_id = ?");
            values.push(Value::Integer(team_id.0));
        }
        if let Some(system) = filter.system {
            clauses.push("system = ?");
            values.push(Value::Text(system.as_str().to_string()));
        }
        if let Some(season) = filter.season {
            clauses.push("season = ?");
            values.push(Value::Integer(season.into()));
        }

        let mut sql = format!("SELECT {RATING_COLUMNS} FROM rating_snapshots");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY season, system, week, team_id");

        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let ratings = stmt
            .query_map(params_from_iter(values.iter()), rating_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ratings)
    }

    fn upsert_stat_line(&self, line: &RecentGameStatLine) -> Result<(), AppError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT metrics_json FROM stat_lines WHERE team_id = ?1 AND game_id = ?2",
                params![line.team_id.0, line.game_id.0],
                |row| row.get(0),
            )
            .optional()?;

        let mut metrics: BTreeMap<String, f64> = match existing {
            Some(raw) => serde_json::from_str(&raw)?,
            None => BTreeMap::new(),
        };
        metrics.extend(line.metrics.iter().map(|(k, v)| (k.clone(), *v)));

        tx.execute(
            "INSERT INTO stat_lines (team_id, game_id, game_date, opponent_team_id, metrics_json)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(team_id, game_id) DO UPDATE SET
                game_date = excluded.game_date,
                opponent_team_id = COALESCE(excluded.opponent_team_id, stat_lines.opponent_team_id),
                metrics_json = excluded.metrics_json",
            params![
                line.team_id.0,
                line.game_id.0,
                format_date(line.game_date),
                line.opponent_team_id.map(|t| t.0),
                serde_json::to_string(&metrics)?
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn recent_stat_lines(
        &self,
        team_id: TeamId,
        limit: usize,
    ) -> Result<Vec<RecentGameStatLine>, AppError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT team_id, game_id, game_date, opponent_team_id, metrics_json FROM stat_lines
             WHERE team_id = ?1 ORDER BY game_date DESC, game_id DESC LIMIT ?2",
        )?;
        let lines = stmt
            .query_map(params![team_id.0, limit as i64], stat_line_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines)
    }

    fn upsert_prediction(&self, prediction: &HypotheticalPrediction) -> Result<(), AppError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO predictions (game_id, home_team_id, away_team_id, home_rating_a,
                                      away_rating_a, home_rating_b, away_rating_b,
                                      home_win_probability, spread, favored, favored_team_id,
                                      correct, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(game_id) DO UPDATE SET
                home_team_id = excluded.home_team_id,
                away_team_id = excluded.away_team_id,
                home_rating_a = excluded.home_rating_a,
                away_rating_a = excluded.away_rating_a,
                home_rating_b = excluded.home_rating_b,
                away_rating_b = excluded.away_rating_b,
                home_win_probability = excluded.home_win_probability,
                spread = excluded.spread,
                favored = excluded.favored,
                favored_team_id = excluded.favored_team_id,
                correct = excluded.correct,
                updated_at = excluded.updated_at",
            params![
                prediction.game_id.0,
                prediction.home_team_id.0,
                prediction.away_team_id.0,
                prediction.home_rating_a,
                prediction.away_rating_a,
                prediction.home_rating_b,
                prediction.away_rating_b,
                prediction.home_win_probability,
                prediction.spread,
                prediction.favored.as_str(),
                prediction.favored_team_id.map(|t| t.0),
                prediction.correct,
                prediction.created_at.to_rfc3339(),
                prediction.updated_at.to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn prediction(&self, game_id: GameId) -> Result<Option<HypotheticalPrediction>, AppError> {
        let conn = self.conn();
        let prediction = conn
            .query_row(
                &format!("SELECT {PREDICTION_COLUMNS} FROM predictions p WHERE p.game_id = ?1"),
                params![game_id.0],
                prediction_from_row,
            )
            .optional()?;
        Ok(prediction)
    }

    fn predictions(&self, season: Option<i32>) -> Result<Vec<HypotheticalPrediction>, AppError> {
        let conn = self.conn();
        let predictions = match season {
            Some(season) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PREDICTION_COLUMNS} FROM predictions p
                     JOIN games g ON g.id = p.game_id
                     WHERE g.season = ?1 ORDER BY g.game_date, p.game_id"
                ))?;
                stmt.query_map(params![season], prediction_from_row)?
                    .collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {PREDICTION_COLUMNS} FROM predictions p ORDER BY p.game_id"
                ))?;
                stmt.query_map([], prediction_from_row)?
                    .collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(predictions)
    }
}
