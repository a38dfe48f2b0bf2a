// QR lifecycle: fetch-or-create, usage polling with auto-regeneration,
// and history navigation.

mod carousel;
mod lifecycle;

pub use carousel::QrCarousel;
pub use lifecycle::{FetchOutcome, PollOutcome, QrLifecycle};
