// ── QR history carousel ──
//
// Pure navigation state over a venue's QR history (server-provided,
// newest first). No I/O: the caller fetches history through the api
// crate and converts the records.

use chrono::Utc;

use crate::model::QrCode;

/// Bounds-checked linear navigation over a venue's historical QR codes.
#[derive(Debug, Clone)]
pub struct QrCarousel {
    codes: Vec<QrCode>,
    index: usize,
}

impl QrCarousel {
    /// Build a carousel positioned on the first code that can still
    /// admit a scan (active, not full, not expired), or on the first
    /// entry when none qualifies.
    pub fn new(codes: Vec<QrCode>) -> Self {
        let now = Utc::now();
        let index = codes
            .iter()
            .position(|qr| qr.is_admittable_at(now))
            .unwrap_or(0);
        Self { codes, index }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// The code under the cursor, if any.
    pub fn current(&self) -> Option<&QrCode> {
        self.codes.get(self.index)
    }

    /// 1-based position for display, as `(position, total)`.
    pub fn position(&self) -> (usize, usize) {
        (self.index + 1, self.codes.len())
    }

    /// Move forward. Returns `false` at the end.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.codes.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move backward. Returns `false` at the start.
    pub fn prev(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to an index. Out-of-range targets are rejected.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.codes.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    pub fn codes(&self) -> &[QrCode] {
        &self.codes
    }
}
