use super::types::{Generated, IssueKind, SchedError, UnmetShift, ValidationIssue};
use super::util::Ledger;
use super::{validation, Scheduler};
use crate::model::{Assignment, Employee, EmployeeId, Shift};
use crate::schedule::Schedule;

/// Glouton déterministe : créneaux dans l'ordre total du modèle, candidats
/// classés par charge. Un créneau resté court tente un échange avec les
/// affectations antérieures, puis le planning passe l'auto-contrôle.
pub(super) fn generate(scheduler: &Scheduler<'_>) -> Result<Generated, SchedError> {
    let ordered = scheduler.constraints.shifts_ordered_by_start();
    let mut ledger = Ledger::default();
    let mut crews: Vec<Vec<EmployeeId>> = Vec::with_capacity(ordered.len());
    let mut unmet = Vec::new();

    for (pos, shift) in ordered.iter().enumerate() {
        let pool = scheduler.ranked_pool(shift, &ledger);
        let required = shift.min_staff as usize;
        let mut taken: Vec<EmployeeId> = pool.iter().take(required).map(|e| e.id.clone()).collect();

        if scheduler.opts.fill_headroom {
            let later = &ordered[pos + 1..];
            for candidate in pool.iter().skip(taken.len()) {
                if taken.len() >= shift.max_staff as usize {
                    break;
                }
                if scheduler.needed_later(&candidate.id, shift, later, &ledger) {
                    tracing::debug!(
                        employee = %candidate.id,
                        shift = %shift.id,
                        "optional fill skipped, employee required by a later shift"
                    );
                    continue;
                }
                taken.push(candidate.id.clone());
            }
        }

        for employee in &taken {
            ledger.record(employee, shift.interval());
        }
        crews.push(taken);
        if crews[pos].len() < required {
            scheduler.repair(&ordered, &mut crews, &mut ledger);
        }
        let assigned = crews[pos].len();

        tracing::debug!(
            shift = %shift.id,
            role = %shift.role,
            candidates = pool.len(),
            assigned,
            "shift processed"
        );

        if assigned < required {
            tracing::warn!(
                shift = %shift.id,
                name = %shift.name,
                required,
                assigned,
                "shift left understaffed"
            );
            unmet.push(UnmetShift {
                shift: shift.id.clone(),
                role: shift.role.clone(),
                required: shift.min_staff,
                assigned: assigned as u32,
            });
        }
    }

    let assignments = ordered
        .iter()
        .zip(crews)
        .flat_map(|(shift, crew)| {
            crew.into_iter()
                .map(move |employee| Assignment::new(employee, shift.id.clone()))
        })
        .collect();
    let schedule = Schedule::new(scheduler.constraints.shifts().to_vec(), assignments)?;

    self_check(validation::validate(
        &schedule,
        scheduler.constraints,
        scheduler.availability,
    ))?;
    Ok(Generated { schedule, unmet })
}

/// Un planning généré ne peut violer qu'une contrainte : l'effectif minimal.
fn self_check(issues: Vec<ValidationIssue>) -> Result<(), SchedError> {
    let defects: Vec<_> = issues
        .into_iter()
        .filter(|issue| issue.kind != IssueKind::Understaffed)
        .collect();
    if defects.is_empty() {
        return Ok(());
    }
    tracing::error!(count = defects.len(), "generated schedule failed its self-check");
    Err(SchedError::InternalInvariantViolation(defects))
}

impl<'a> Scheduler<'a> {
    /// Candidats éligibles, classés : moins de minutes, moins de créneaux,
    /// puis identifiant.
    pub(super) fn ranked_pool(&self, shift: &Shift, ledger: &Ledger) -> Vec<&'a Employee> {
        let mut pool: Vec<&'a Employee> = self
            .availability
            .employees()
            .iter()
            .filter(|e| self.eligible(e, shift, ledger))
            .collect();
        pool.sort_by(|a, b| {
            (ledger.minutes(&a.id), ledger.shift_count(&a.id), &a.id)
                .cmp(&(ledger.minutes(&b.id), ledger.shift_count(&b.id), &b.id))
        });
        pool
    }

    pub(super) fn eligible(&self, employee: &Employee, shift: &Shift, ledger: &Ledger) -> bool {
        let rules = self.constraints.rules();
        let interval = shift.interval();

        if !employee.holds(&shift.role) {
            return false;
        }
        if !self
            .availability
            .is_available(&employee.id, &shift.role, &interval)
        {
            return false;
        }
        if !rules.allow_overlap && ledger.overlaps(&employee.id, &interval) {
            return false;
        }
        match rules.cap_minutes(employee.max_hours) {
            Some(cap) => ledger.minutes(&employee.id) + shift.duration_minutes() <= cap,
            None => true,
        }
    }

    /// Comble le dernier créneau de `crews` en déplaçant vers lui un employé
    /// déjà affecté plus tôt, à condition qu'un remplaçant éligible reprenne
    /// sa place. Les créneaux antérieurs gardent leur effectif. Parcours
    /// déterministe : créneaux dans l'ordre, équipes dans l'ordre.
    pub(super) fn repair(
        &self,
        ordered: &[&Shift],
        crews: &mut [Vec<EmployeeId>],
        ledger: &mut Ledger,
    ) {
        let Some((current, earlier)) = crews.split_last_mut() else {
            return;
        };
        let shift = ordered[earlier.len()];
        'slot: while current.len() < shift.min_staff as usize {
            for (j, crew) in earlier.iter_mut().enumerate() {
                for k in 0..crew.len() {
                    let moved = crew[k].clone();
                    if let Some(replacement) =
                        self.try_swap(ordered[j], shift, &moved, &crew[..], &current[..], ledger)
                    {
                        tracing::debug!(
                            employee = %moved,
                            from = %ordered[j].id,
                            to = %shift.id,
                            replacement = %replacement,
                            "assignment swapped to cover a short shift"
                        );
                        crew[k] = replacement;
                        current.push(moved);
                        continue 'slot;
                    }
                }
            }
            break;
        }
    }

    /// Essaie de faire passer `moved` de `earlier` à `current`. En cas de
    /// succès le ledger reflète l'échange et le remplaçant est renvoyé ;
    /// sinon le ledger est restauré.
    fn try_swap(
        &self,
        earlier: &Shift,
        current: &Shift,
        moved: &EmployeeId,
        earlier_crew: &[EmployeeId],
        current_crew: &[EmployeeId],
        ledger: &mut Ledger,
    ) -> Option<EmployeeId> {
        if current_crew.contains(moved) {
            return None;
        }
        let employee = self.availability.employee(moved)?;

        ledger.remove(moved, earlier.interval());
        if self.eligible(employee, current, ledger) {
            ledger.record(moved, current.interval());
            let replacement = self
                .ranked_pool(earlier, ledger)
                .into_iter()
                .find(|r| !earlier_crew.contains(&r.id))
                .map(|r| r.id.clone());
            if let Some(replacement) = replacement {
                ledger.record(&replacement, earlier.interval());
                return Some(replacement);
            }
            ledger.remove(moved, current.interval());
        }
        ledger.record(moved, earlier.interval());
        None
    }

    /// Un créneau ultérieur du même rôle a besoin de tous ses candidats et
    /// `employee` en fait partie.
    pub(super) fn needed_later(
        &self,
        employee: &EmployeeId,
        current: &Shift,
        later: &[&Shift],
        ledger: &Ledger,
    ) -> bool {
        later
            .iter()
            .filter(|s| s.role == current.role && s.min_staff > 0)
            .any(|s| {
                let pool = self.ranked_pool(s, ledger);
                pool.len() <= s.min_staff as usize && pool.iter().any(|e| &e.id == employee)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShiftId;

    fn issue(kind: IssueKind, shift: &str) -> ValidationIssue {
        ValidationIssue {
            kind,
            shift: Some(ShiftId::new(shift)),
            employee: None,
            related_shift: None,
            message: String::new(),
        }
    }

    #[test]
    fn understaffing_alone_passes_the_self_check() {
        assert!(self_check(vec![]).is_ok());
        let issues = vec![
            issue(IssueKind::Understaffed, "mon"),
            issue(IssueKind::Understaffed, "tue"),
        ];
        assert!(self_check(issues).is_ok());
    }

    #[test]
    fn any_other_issue_fails_the_self_check() {
        let mut double = issue(IssueKind::DoubleBooking, "late");
        double.employee = Some(EmployeeId::new("alice"));
        double.related_shift = Some(ShiftId::new("early"));
        let issues = vec![issue(IssueKind::Understaffed, "mon"), double.clone()];

        match self_check(issues) {
            Err(SchedError::InternalInvariantViolation(defects)) => {
                assert_eq!(defects, vec![double]);
            }
            other => panic!("unexpected self-check outcome: {other:?}"),
        }
    }
}
