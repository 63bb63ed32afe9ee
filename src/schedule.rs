use crate::model::{Assignment, EmployeeId, Interval, ModelError, Shift, ShiftId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Planning produit ou saisi : affectations triées par heure de début,
/// plus les créneaux contre lesquels il a été construit. Immuable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule", into = "RawSchedule")]
pub struct Schedule {
    shifts: Vec<Shift>,
    assignments: Vec<Assignment>,
}

#[derive(Serialize, Deserialize)]
struct RawSchedule {
    #[serde(default)]
    shifts: Vec<Shift>,
    #[serde(default)]
    assignments: Vec<Assignment>,
}

/// Ligne exportable : (employé, créneau, intervalle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry<'a> {
    pub employee: &'a EmployeeId,
    pub shift: &'a Shift,
    pub interval: Interval,
}

impl Schedule {
    /// Construit un planning ; toute affectation doit viser un créneau fourni,
    /// et une seule fois.
    pub fn new(shifts: Vec<Shift>, mut assignments: Vec<Assignment>) -> Result<Self, ModelError> {
        let index: HashMap<&ShiftId, &Shift> = shifts.iter().map(|s| (&s.id, s)).collect();
        if index.len() != shifts.len() {
            let dup = shifts
                .iter()
                .find(|s| shifts.iter().filter(|o| o.id == s.id).count() > 1)
                .map(|s| s.id.to_string())
                .unwrap_or_default();
            return Err(ModelError::DuplicateShift(dup));
        }
        let mut seen = HashSet::with_capacity(assignments.len());
        for a in &assignments {
            if !index.contains_key(&a.shift) {
                return Err(ModelError::UnknownShift(a.shift.to_string()));
            }
            if !seen.insert(a) {
                return Err(ModelError::DuplicateAssignment(format!(
                    "{} on {}",
                    a.employee, a.shift
                )));
            }
        }
        assignments.sort_by(|a, b| {
            let sa = index[&a.shift];
            let sb = index[&b.shift];
            (sa.start, &sa.id, &a.employee).cmp(&(sb.start, &sb.id, &b.employee))
        });
        Ok(Self {
            shifts,
            assignments,
        })
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn shift(&self, id: &ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Énumération ordonnée pour les exports.
    pub fn entries(&self) -> impl Iterator<Item = ScheduleEntry<'_>> + '_ {
        self.assignments.iter().filter_map(move |a| {
            self.shift(&a.shift).map(|shift| ScheduleEntry {
                employee: &a.employee,
                shift,
                interval: shift.interval(),
            })
        })
    }

    pub fn assigned_to<'a>(&'a self, shift: &'a ShiftId) -> impl Iterator<Item = &'a EmployeeId> + 'a {
        self.assignments
            .iter()
            .filter(move |a| &a.shift == shift)
            .map(|a| &a.employee)
    }

    pub fn staff_count(&self, shift: &ShiftId) -> usize {
        self.assigned_to(shift).count()
    }

    pub fn shifts_of<'a>(&'a self, employee: &'a EmployeeId) -> impl Iterator<Item = &'a Shift> + 'a {
        self.assignments
            .iter()
            .filter(move |a| &a.employee == employee)
            .filter_map(move |a| self.shift(&a.shift))
    }

    pub fn assigned_minutes(&self, employee: &EmployeeId) -> i64 {
        self.shifts_of(employee).map(Shift::duration_minutes).sum()
    }

    /// Copie modifiée (édition manuelle) : retire puis ajoute des affectations.
    pub fn edited(
        &self,
        remove: &[Assignment],
        add: Vec<Assignment>,
    ) -> Result<Self, ModelError> {
        let mut assignments: Vec<Assignment> = self
            .assignments
            .iter()
            .filter(|a| !remove.contains(a))
            .cloned()
            .collect();
        assignments.extend(add);
        Self::new(self.shifts.clone(), assignments)
    }
}

impl TryFrom<RawSchedule> for Schedule {
    type Error = ModelError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        Self::new(raw.shifts, raw.assignments)
    }
}

impl From<Schedule> for RawSchedule {
    fn from(schedule: Schedule) -> Self {
        Self {
            shifts: schedule.shifts,
            assignments: schedule.assignments,
        }
    }
}
