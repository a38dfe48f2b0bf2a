// roundtable-core: Domain layer between roundtable-api and consumers.
//
// Owns the QR lifecycle, session phase/timer reconciliation, the seeded
// survey shuffle, and the offline snapshot cache.

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod lobby;
pub mod model;
pub mod poll;
pub mod qr;
pub mod session;
pub mod shuffle;
pub mod stream;
pub mod survey;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{QrSnapshot, SessionSnapshot, SnapshotCache};
pub use config::{ClientConfig, Timing};
pub use error::CoreError;
pub use lobby::LobbyWatch;
pub use poll::PollingSession;
pub use qr::{FetchOutcome, PollOutcome, QrCarousel, QrLifecycle};
pub use session::{PhaseClock, ResyncOutcome, ServerApply, SessionEngine};
pub use stream::StateStream;
pub use survey::{SurveyRun, SurveyStep};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    MAX_RANK, Participant, QrCode, QrId, RankingSelection, ReadyState, SessionId, SessionPhase,
    SessionRules, SurveyQuestion, UserId, VenueId,
};
