pub mod event;
pub mod factory;
pub mod leaderboard;
pub mod level;
pub mod score;
pub mod snapshot;
pub mod step;
pub mod world;
