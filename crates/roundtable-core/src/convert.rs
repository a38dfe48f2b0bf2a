// ── Wire → domain conversions ──
//
// The api crate's types mirror the backend JSON; everything above this
// module works with the domain types. Conversions that need context the
// wire record lacks (the venue a QR belongs to) are free functions
// rather than `From` impls.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use roundtable_api::types::{
    ParticipantRecord, QrHistoryRecord, QrIssued, QuestionRecord, ReadyStatusRecord,
    SessionRulesRead,
};

use crate::config::Timing;
use crate::error::CoreError;
use crate::model::{
    Participant, QrCode, QrId, ReadyState, SessionPhase, SessionRules, SurveyQuestion, UserId,
    VenueId,
};

/// Build a [`QrCode`] from an issue response. The issue endpoint omits
/// the venue (the caller asked by venue), so it is threaded back in.
pub fn qr_from_issued(issued: QrIssued, venue_id: VenueId) -> Result<QrCode, CoreError> {
    Ok(QrCode {
        id: QrId::new(issued.qr_id)?,
        data: issued.qr_string,
        venue_id,
        group_id: issued.qr_group_id,
        created_at: None,
        expires_at: issued.expires_at,
        max_capacity: issued.max_capacity,
        current_usage: issued.current_usage,
        is_active: true,
    })
}

/// Build a [`QrCode`] from a history record.
pub fn qr_from_history(record: QrHistoryRecord, venue_id: VenueId) -> Result<QrCode, CoreError> {
    Ok(QrCode {
        id: QrId::new(record.id)?,
        data: record.qr_data,
        venue_id,
        group_id: record.qr_group_id,
        created_at: record.created_at,
        expires_at: record.expires_at,
        max_capacity: record.max_capacity,
        current_usage: record.current_usage,
        is_active: record.is_active,
    })
}

/// Parse a wire phase name, or `None` (with a warning) for anything the
/// client does not recognize. Poll loops skip unknown phases rather than
/// guessing.
pub fn parse_phase(raw: &str) -> Option<SessionPhase> {
    match SessionPhase::from_str(raw) {
        Ok(phase) => Some(phase),
        Err(_) => {
            warn!(phase = raw, "server reported unknown session phase");
            None
        }
    }
}

/// Session rules from the wire, with configured fallbacks for anything
/// the server left out. Wire durations are minutes.
pub fn rules_from_wire(read: SessionRulesRead, timing: &Timing) -> SessionRules {
    let minutes = |m: Option<u64>, fallback: Duration| {
        m.map_or(fallback, |m| Duration::from_secs(m * 60))
    };

    SessionRules {
        prep: minutes(read.prep_time, timing.fallback_prep),
        discussion: minutes(read.discussion_time, timing.fallback_discussion),
        survey: minutes(read.survey_time, timing.fallback_survey),
        level: read.level.unwrap_or(1),
    }
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = CoreError;

    fn try_from(record: ParticipantRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(record.id)?,
            name: record.name,
            department: record.department,
        })
    }
}

impl TryFrom<ReadyStatusRecord> for ReadyState {
    type Error = CoreError;

    fn try_from(record: ReadyStatusRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: UserId::new(record.student_id)?,
            is_ready: record.is_ready,
        })
    }
}

impl From<QuestionRecord> for SurveyQuestion {
    fn from(record: QuestionRecord) -> Self {
        Self {
            id: record.id,
            text: record.text,
            weight: record.weight,
        }
    }
}
