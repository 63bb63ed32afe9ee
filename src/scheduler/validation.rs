use super::types::{IssueKind, ValidationIssue};
use crate::availability::AvailabilityStore;
use crate::constraints::ConstraintModel;
use crate::model::{EmployeeId, Shift, ShiftId};
use crate::schedule::Schedule;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

type SortKey = (Option<DateTime<Utc>>, Option<ShiftId>, IssueKind, Option<EmployeeId>);

/// Collecte les issues avec leur clé de tri, puis les ordonne.
#[derive(Default)]
struct Collector {
    items: Vec<(SortKey, ValidationIssue)>,
}

impl Collector {
    fn push(&mut self, at: Option<&Shift>, issue: ValidationIssue) {
        let key = (
            at.map(|s| s.start),
            at.map(|s| s.id.clone()),
            issue.kind,
            issue.employee.clone(),
        );
        self.items.push((key, issue));
    }

    fn finish(mut self) -> Vec<ValidationIssue> {
        self.items.sort_by(|a, b| a.0.cmp(&b.0));
        self.items.into_iter().map(|(_, issue)| issue).collect()
    }
}

pub(super) fn validate(
    schedule: &Schedule,
    constraints: &ConstraintModel,
    availability: &AvailabilityStore,
) -> Vec<ValidationIssue> {
    let mut out = Collector::default();

    check_staffing(schedule, constraints, &mut out);
    check_assignments(schedule, constraints, availability, &mut out);
    check_per_employee(schedule, constraints, availability, &mut out);

    let issues = out.finish();
    tracing::debug!(
        assignments = schedule.assignments().len(),
        issues = issues.len(),
        "schedule validated"
    );
    issues
}

fn check_staffing(schedule: &Schedule, constraints: &ConstraintModel, out: &mut Collector) {
    for shift in constraints.shifts() {
        let count = schedule.staff_count(&shift.id) as u32;
        let kind = if count < shift.min_staff {
            IssueKind::Understaffed
        } else if count > shift.max_staff {
            IssueKind::Overstaffed
        } else {
            continue;
        };
        let message = format!(
            "{} ({}, {}) is {}. Required: {}-{}, Assigned: {}.",
            shift.name,
            shift.role,
            shift.start.to_rfc3339(),
            kind,
            shift.min_staff,
            shift.max_staff,
            count
        );
        out.push(
            Some(shift),
            ValidationIssue {
                kind,
                shift: Some(shift.id.clone()),
                employee: None,
                related_shift: None,
                message,
            },
        );
    }
}

fn check_assignments(
    schedule: &Schedule,
    constraints: &ConstraintModel,
    availability: &AvailabilityStore,
    out: &mut Collector,
) {
    for a in schedule.assignments() {
        let Some(shift) = constraints.shift(&a.shift) else {
            out.push(
                schedule.shift(&a.shift),
                ValidationIssue {
                    kind: IssueKind::UnknownShift,
                    shift: Some(a.shift.clone()),
                    employee: Some(a.employee.clone()),
                    related_shift: None,
                    message: format!(
                        "{} is assigned to shift {} which is not part of the constraint model",
                        a.employee, a.shift
                    ),
                },
            );
            continue;
        };

        let employee = availability.employee(&a.employee);
        if !employee.is_some_and(|e| e.holds(&shift.role)) {
            let message = match employee {
                Some(e) => format!("{} does not hold role {} required by {}", e.name, shift.role, shift.name),
                None => format!("{} is not a known employee (shift {})", a.employee, shift.name),
            };
            out.push(
                Some(shift),
                ValidationIssue {
                    kind: IssueKind::UnqualifiedAssignment,
                    shift: Some(shift.id.clone()),
                    employee: Some(a.employee.clone()),
                    related_shift: None,
                    message,
                },
            );
        }

        if !availability.is_available(&a.employee, &shift.role, &shift.interval()) {
            out.push(
                Some(shift),
                ValidationIssue {
                    kind: IssueKind::UnavailableAssignment,
                    shift: Some(shift.id.clone()),
                    employee: Some(a.employee.clone()),
                    related_shift: None,
                    message: format!(
                        "{} is not available as {} for the whole of {} ({} → {})",
                        a.employee,
                        shift.role,
                        shift.name,
                        shift.start.to_rfc3339(),
                        shift.end.to_rfc3339()
                    ),
                },
            );
        }
    }
}

fn check_per_employee(
    schedule: &Schedule,
    constraints: &ConstraintModel,
    availability: &AvailabilityStore,
    out: &mut Collector,
) {
    let rules = constraints.rules();

    let mut by_employee: BTreeMap<&EmployeeId, Vec<&Shift>> = BTreeMap::new();
    for a in schedule.assignments() {
        let shift = constraints.shift(&a.shift).or_else(|| schedule.shift(&a.shift));
        if let Some(shift) = shift {
            by_employee.entry(&a.employee).or_default().push(shift);
        }
    }

    for (employee, mut shifts) in by_employee {
        shifts.sort_by(|a, b| (a.start, &a.id).cmp(&(b.start, &b.id)));
        if !rules.allow_overlap {
            for (idx, &a) in shifts.iter().enumerate() {
                for &b in shifts.iter().skip(idx + 1) {
                    if a.interval().overlaps(&b.interval()) {
                        out.push(
                            Some(b),
                            ValidationIssue {
                                kind: IssueKind::DoubleBooking,
                                shift: Some(b.id.clone()),
                                employee: Some(employee.clone()),
                                related_shift: Some(a.id.clone()),
                                message: format!(
                                    "{} is double-booked: {} overlaps {}",
                                    employee, a.name, b.name
                                ),
                            },
                        );
                    }
                }
            }
        }

        let cap = rules.cap_minutes(availability.employee(employee).and_then(|e| e.max_hours));
        if let Some(cap) = cap {
            let mut total = 0i64;
            let exceeded_at = shifts.iter().find(|s| {
                total += s.duration_minutes();
                total > cap
            }).copied();
            if let Some(at) = exceeded_at {
                let all: i64 = shifts.iter().map(|s| s.duration_minutes()).sum();
                out.push(
                    Some(at),
                    ValidationIssue {
                        kind: IssueKind::OverHours,
                        shift: Some(at.id.clone()),
                        employee: Some(employee.clone()),
                        related_shift: None,
                        message: format!(
                            "{} works {}h{:02} against a cap of {}h (exceeded at {})",
                            employee,
                            all / 60,
                            all % 60,
                            cap / 60,
                            at.name
                        ),
                    },
                );
            }
        }
    }
}
