//! Provider wire formats and the typed-optional records the fetchers yield.

pub mod box_score;
pub mod common;
pub mod rankings;
pub mod schedule;
pub mod scoreboard;

pub use box_score::{BoxScoreRecord, BoxScoreSummary, Linescore, TeamBoxLine};
pub use rankings::{AdvancedRatingRecord, RankingRecord, RatingsApiEntry, RatingsApiPage};
pub use schedule::ScheduleRecord;
pub use scoreboard::{ScoreboardEvent, ScoreboardRecord, ScoreboardResponse};
