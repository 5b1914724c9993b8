pub mod classes;
pub mod skills;
pub mod snapshot;
pub mod students;

pub use classes::extract_classes;
pub use skills::extract_skill_statuses;
pub use snapshot::{read_snapshot, SnapshotError};
pub use students::extract_student_progress;

use scraper::{ElementRef, Selector};

/// Parse a static CSS selector, `None` on a malformed pattern so callers
/// degrade to "no matches" instead of failing the page.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Element text with whitespace collapsed to single spaces.
pub(crate) fn normalized_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
