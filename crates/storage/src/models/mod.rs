mod catch;
mod event;
mod event_result;
mod participant;
mod rating_history;
mod team;
mod team_participation;
mod user;

pub use catch::Catch;
pub use event::{EventFormat, FishingEvent};
pub use event_result::{EventResult, ParticipantType};
pub use participant::FishingParticipant;
pub use rating_history::RatingHistory;
pub use team::{Team, TeamMember, TeamRole, MAX_TEAM_SIZE};
pub use team_participation::TeamParticipation;
pub use user::{User, DEFAULT_RATING};
