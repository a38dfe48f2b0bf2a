// Domain model for the GD assessment client.

mod ids;
mod qr;
mod session;
mod survey;

pub use ids::{QrId, SessionId, UserId, VenueId};
pub use qr::QrCode;
pub use session::{Participant, ReadyState, SessionPhase, SessionRules};
pub use survey::{MAX_RANK, RankingSelection, SurveyQuestion};
