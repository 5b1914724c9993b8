//! Class-index extraction.

use scraper::Html;
use tracing::debug;

use swimlane_core::model::ClassDescriptor;

use crate::{normalized_text, selector};

/// Pull every real class out of the class-index document.
///
/// Classes are the table rows flagged clickable; the first two cells are
/// start time and class name. Rows whose name yields no stage key are not
/// classes (headers, closures, private hire) and are dropped silently.
pub fn extract_classes(html: &str) -> Vec<ClassDescriptor> {
    let document = Html::parse_document(html);
    let (Some(row_sel), Some(cell_sel)) = (selector("tr.clickable"), selector("td")) else {
        return Vec::new();
    };

    let mut classes = Vec::new();
    for row in document.select(&row_sel) {
        let cells: Vec<String> = row.select(&cell_sel).map(|c| normalized_text(&c)).collect();
        if cells.len() < 2 {
            continue;
        }
        match ClassDescriptor::from_row(&cells[0], &cells[1]) {
            Some(descriptor) => classes.push(descriptor),
            None => debug!(row = %cells[1], "index row has no stage key, skipping"),
        }
    }
    classes
}
