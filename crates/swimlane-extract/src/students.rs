//! Register-page extraction: per-student completion percentages.

use scraper::Html;

use swimlane_core::model::{clean_name, StudentRecord, StudentRoster};

use crate::{normalized_text, selector};

/// Build the roster from a register document.
///
/// Each student is a list entry linking to their per-member assessment
/// page; the entry title holds a completion percentage span and the
/// display name. The clean name (percentage removed, "(Stage ...)" suffix
/// stripped) keys the roster so later skill documents merge onto the same
/// record.
pub fn extract_student_progress(html: &str) -> StudentRoster {
    let document = Html::parse_document(html);
    let mut roster = StudentRoster::new();

    let (Some(link_sel), Some(title_sel), Some(pct_sel)) = (
        selector(r#"a[href*="/assess-by-member/"]"#),
        selector("div.v-list-item__title"),
        selector("span.percentage-complete"),
    ) else {
        return roster;
    };

    for link in document.select(&link_sel) {
        let Some(title) = link.select(&title_sel).next() else {
            continue;
        };
        let Some(percentage_span) = title.select(&pct_sel).next() else {
            continue;
        };
        let percentage = normalized_text(&percentage_span);
        let full_text = normalized_text(&title);
        let display_name = full_text.replacen(&percentage, "", 1).trim().to_string();

        roster.insert(
            clean_name(&display_name),
            StudentRecord {
                display_name,
                overall_progress: percentage,
                skills: Vec::new(),
            },
        );
    }
    roster
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(entries: &[(&str, &str)]) -> String {
        let items: String = entries
            .iter()
            .map(|(name, pct)| {
                format!(
                    r#"<a href="/assess-by-member/{n}">
                         <div class="v-list-item__title">
                           <span class="percentage-complete">{pct}</span> {name}
                         </div>
                       </a>"#,
                    n = name.len(),
                )
            })
            .collect();
        format!("<html><body><div role=\"list\">{items}</div></body></html>")
    }

    #[test]
    fn extracts_percentage_and_display_name() {
        let roster = extract_student_progress(&register(&[("Alice Smith (Stage 3)", "40%")]));
        let record = roster.get("Alice Smith").unwrap();
        assert_eq!(record.display_name, "Alice Smith (Stage 3)");
        assert_eq!(record.overall_progress, "40%");
        assert!(record.skills.is_empty());
    }

    #[test]
    fn roster_is_keyed_by_clean_name() {
        let roster = extract_student_progress(&register(&[
            ("Zara Quinn (Stage 3)", "90%"),
            ("Alice Smith (Stage 3)", "40%"),
        ]));
        let keys: Vec<_> = roster.keys().cloned().collect();
        assert_eq!(keys, vec!["Alice Smith", "Zara Quinn"]);
    }

    #[test]
    fn entries_without_percentage_span_are_skipped() {
        let html = r#"<a href="/assess-by-member/1">
                        <div class="v-list-item__title">No Percentage Kid</div>
                      </a>"#;
        assert!(extract_student_progress(html).is_empty());
    }

    #[test]
    fn unrelated_links_are_ignored() {
        let html = r#"<a href="/somewhere-else/1">
                        <div class="v-list-item__title">
                          <span class="percentage-complete">10%</span> Not A Student
                        </div>
                      </a>"#;
        assert!(extract_student_progress(html).is_empty());
    }

    #[test]
    fn empty_register_yields_empty_roster() {
        assert!(extract_student_progress("<html></html>").is_empty());
    }
}
