use crate::constraints::ConstraintModel;
use crate::scheduler::{UnmetShift, ValidationIssue};
use std::fmt::Write;

/// Permet de customiser le rendu du rapport (texte, CSV, etc.).
pub trait ReportRenderer {
    fn render_unmet(&self, unmet: &UnmetShift, constraints: &ConstraintModel) -> String;
    fn render_issue(&self, issue: &ValidationIssue) -> String;
}

/// Rendu texte simple, une ligne par manque ou violation.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

impl ReportRenderer for TextReport {
    fn render_unmet(&self, unmet: &UnmetShift, constraints: &ConstraintModel) -> String {
        let label = constraints
            .shift(&unmet.shift)
            .map(|s| format!("{} ({})", s.name, s.start.format("%Y-%m-%d %H:%M")))
            .unwrap_or_else(|| unmet.shift.to_string());
        format!(
            "Warning: {label} is understaffed. Required: {}, Assigned: {}.",
            unmet.required, unmet.assigned
        )
    }

    fn render_issue(&self, issue: &ValidationIssue) -> String {
        format!("[{}] {}", issue.kind, issue.message)
    }
}

/// Assemble le rapport complet ; chaîne vide si rien à signaler.
pub fn render_report(
    unmet: &[UnmetShift],
    issues: &[ValidationIssue],
    constraints: &ConstraintModel,
    renderer: &dyn ReportRenderer,
) -> String {
    let mut out = String::new();
    for u in unmet {
        let _ = writeln!(out, "{}", renderer.render_unmet(u, constraints));
    }
    for issue in issues {
        let _ = writeln!(out, "{}", renderer.render_issue(issue));
    }
    out
}
