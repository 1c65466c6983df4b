mod mission;
mod progress;

pub use mission::{Category, Difficulty, Mission, MissionChanges, NewMission};
pub use progress::{CompletionOutcome, CompletionRecord, UserMissionState, UserProgress};
