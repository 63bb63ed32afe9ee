#![forbid(unsafe_code)]
//! Roulement — affectation d'employés aux créneaux et validation de planning.
//!
//! - Disponibilités par rôle, intervalles UTC semi-ouverts.
//! - Génération gloutonne déterministe, équilibrée par la charge.
//! - Validation indépendante de tout planning (généré, importé, édité).
//! - Stockage fichiers (JSON/CSV), sans base de données.

pub mod availability;
pub mod constraints;
pub mod io;
pub mod model;
pub mod report;
pub mod schedule;
pub mod scheduler;
pub mod storage;
pub mod template;

pub use availability::AvailabilityStore;
pub use constraints::{ConstraintModel, GlobalRules};
pub use model::{
    Assignment, AvailabilityWindow, Employee, EmployeeId, Interval, ModelError, Requirement,
    Role, Shift, ShiftId,
};
pub use report::{render_report, ReportRenderer, TextReport};
pub use schedule::{Schedule, ScheduleEntry};
pub use scheduler::{
    generate, validate, GenerateOptions, Generated, IssueKind, SchedError, Scheduler, UnmetShift,
    ValidationIssue,
};
pub use storage::{JsonStorage, SaveInfo, SaveStore, Storage, Workspace};
pub use template::{expand_shifts, export_template_json, load_template_from_file, Slot, Template};
