use crate::model::{EmployeeId, ModelError, Role, ShiftId};
use crate::schedule::Schedule;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Options de génération
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Remplit au-delà du minimum jusqu'à `max_staff` quand cela ne prive
    /// aucun créneau ultérieur du même rôle.
    pub fill_headroom: bool,
}

/// Créneau dont l'effectif minimal n'a pas pu être atteint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetShift {
    pub shift: ShiftId,
    pub role: Role,
    pub required: u32,
    pub assigned: u32,
}

/// Résultat d'une génération : planning au mieux + manques.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub schedule: Schedule,
    pub unmet: Vec<UnmetShift>,
}

impl Generated {
    pub fn is_complete(&self) -> bool {
        self.unmet.is_empty()
    }
}

/// L'ordre des variantes sert de clé de tri secondaire des rapports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    Understaffed,
    Overstaffed,
    UnqualifiedAssignment,
    UnavailableAssignment,
    DoubleBooking,
    OverHours,
    UnknownShift,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Understaffed => "understaffed",
            IssueKind::Overstaffed => "overstaffed",
            IssueKind::UnqualifiedAssignment => "unqualified-assignment",
            IssueKind::UnavailableAssignment => "unavailable-assignment",
            IssueKind::DoubleBooking => "double-booking",
            IssueKind::OverHours => "over-hours",
            IssueKind::UnknownShift => "unknown-shift",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Violation détectée dans un planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub shift: Option<ShiftId>,
    pub employee: Option<EmployeeId>,
    /// Second créneau d'une double affectation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_shift: Option<ShiftId>,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("internal invariant violated: generated schedule has {} issue(s), first: {}", .0.len(), first_message(.0))]
    InternalInvariantViolation(Vec<ValidationIssue>),
}

fn first_message(issues: &[ValidationIssue]) -> &str {
    issues.first().map(|i| i.message.as_str()).unwrap_or("-")
}
