//! Canonical text rendering of a class roster.
//!
//! The output is the exact format the downstream generative stages (and the
//! beautifier that turns plans into documents) key their parsing on, so the
//! shape here is a wire format, not presentation polish.

use crate::model::StudentRoster;

/// Render one class section. Students appear in ascending clean-name order
/// (the roster is a BTreeMap), making re-runs over identical inputs
/// byte-identical.
pub fn render_class_report(class_name: &str, roster: &StudentRoster) -> String {
    let mut lines = vec![
        format!("# Class Report: {class_name}\n"),
        "## Student Progress Summary\n".to_string(),
    ];

    if roster.is_empty() {
        lines.push("No students found in register file.\n".to_string());
        return lines.join("\n");
    }

    for (clean_name, student) in roster {
        let display_name = if student.display_name.is_empty() {
            clean_name
        } else {
            &student.display_name
        };
        lines.push(format!("### {display_name}"));
        lines.push(format!(
            "* **Overall Progress:** {}",
            student.overall_progress
        ));
        if student.skills.is_empty() {
            lines.push("* **Skill Status:** No individual skills assessed.".to_string());
        } else {
            lines.push("* **Skill Status:**".to_string());
            for skill in &student.skills {
                lines.push(format!("    * {}: **{}**", skill.objective, skill.status));
            }
        }
        lines.push("\n".to_string());
    }

    lines.join("\n")
}
