// Library surface for the drill engine and its stores.
// Terminal rendering lives in the binary (main.rs, ui/).
pub mod app_dirs;
pub mod clock;
pub mod drill;
pub mod error;
pub mod runtime;
pub mod selection;
pub mod selector;
pub mod session;
pub mod settings;
pub mod stats;

pub use drill::{DrillSession, InputOutcome, Speed};
pub use error::{DrillError, DrillResult};
pub use settings::Settings;
pub use stats::{LetterStat, LetterStats, StatsSource};
