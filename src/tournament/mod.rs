pub mod lifecycle;
pub mod matches;
pub mod points;
pub mod roster;
pub mod stats;

pub use lifecycle::TournamentService;
pub use matches::MatchService;
pub use points::PointsService;
pub use stats::StatsService;
