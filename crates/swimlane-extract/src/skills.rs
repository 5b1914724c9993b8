//! Skill-page extraction: per-objective assessment statuses.

use scraper::{ElementRef, Html};
use tracing::debug;

use swimlane_core::model::{clean_name, SkillStatus, StudentRoster};

use crate::{normalized_text, selector};

/// Merge one skill document into the roster.
///
/// The page nests grouping elements; only leaf groups carry a single
/// objective, so wrapper groups that contain another group are skipped —
/// processing both levels would double-count every student row. Each row
/// resolves its status from the active control, defaulting to
/// "Not Assessed". Rows naming a student absent from the roster are
/// dropped silently: the register document is the authority on membership.
pub fn extract_skill_statuses(html: &str, roster: &mut StudentRoster) {
    let document = Html::parse_document(html);
    let (Some(group_sel), Some(title_sel), Some(row_sel), Some(link_sel), Some(active_sel)) = (
        selector("div.v-list-group"),
        selector("div.v-list-item__title"),
        selector(r#"div[role="listitem"]"#),
        selector("a"),
        selector("button.v-item--active"),
    ) else {
        return;
    };

    for group in document.select(&group_sel) {
        if contains_nested_group(group) {
            continue;
        }
        let Some(title) = group.select(&title_sel).next() else {
            continue;
        };
        let objective = normalized_text(&title);
        let rows: Vec<_> = group.select(&row_sel).collect();
        if objective.is_empty() || rows.is_empty() {
            continue;
        }

        for row in rows {
            let Some(link) = row.select(&link_sel).next() else {
                continue;
            };
            let student_name = clean_name(&normalized_text(&link));
            let status = row
                .select(&active_sel)
                .next()
                .map(|button| normalized_text(&button))
                .unwrap_or_else(|| "Not Assessed".to_string());

            match roster.get_mut(&student_name) {
                Some(record) => record.skills.push(SkillStatus {
                    objective: objective.clone(),
                    status,
                }),
                None => {
                    debug!(student = %student_name, "skill row for unknown student, dropping")
                }
            }
        }
    }
}

/// True when the group wraps another group (a category, not an objective).
fn contains_nested_group(group: ElementRef<'_>) -> bool {
    group
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "div" && el.value().classes().any(|c| c == "v-list-group"))
}
