use crate::model::{ModelError, Requirement, Shift, ShiftId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Règles globales de la période.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours_per_employee: Option<u32>,
    #[serde(default)]
    pub allow_overlap: bool,
}

impl GlobalRules {
    /// Plafond effectif en minutes : le plus strict des deux plafonds.
    pub fn cap_minutes(&self, employee_cap: Option<u32>) -> Option<i64> {
        let cap = match (employee_cap, self.max_hours_per_employee) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        cap.map(|h| i64::from(h) * 60)
    }
}

/// Créneaux de la période et règles globales.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraints", into = "RawConstraints")]
pub struct ConstraintModel {
    shifts: Vec<Shift>,
    rules: GlobalRules,
}

#[derive(Serialize, Deserialize)]
struct RawConstraints {
    #[serde(default)]
    shifts: Vec<Shift>,
    #[serde(default)]
    rules: GlobalRules,
}

impl ConstraintModel {
    pub fn new(shifts: Vec<Shift>, rules: GlobalRules) -> Result<Self, ModelError> {
        let mut seen = HashSet::new();
        for shift in &shifts {
            shift.check()?;
            if !seen.insert(&shift.id) {
                return Err(ModelError::DuplicateShift(shift.id.to_string()));
            }
        }
        Ok(Self { shifts, rules })
    }

    pub fn rules(&self) -> &GlobalRules {
        &self.rules
    }

    pub fn set_rules(&mut self, rules: GlobalRules) {
        self.rules = rules;
    }

    /// Ajoute un créneau (mêmes contrôles que `new`).
    pub fn add_shift(&mut self, shift: Shift) -> Result<(), ModelError> {
        shift.check()?;
        if self.shift(&shift.id).is_some() {
            return Err(ModelError::DuplicateShift(shift.id.to_string()));
        }
        self.shifts.push(shift);
        Ok(())
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn shift(&self, id: &ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|s| &s.id == id)
    }

    /// Ordre total : début, puis effectif minimal croissant, puis nom de
    /// rôle, puis identifiant.
    pub fn shifts_ordered_by_start(&self) -> Vec<&Shift> {
        let mut ordered: Vec<&Shift> = self.shifts.iter().collect();
        ordered.sort_by(|a, b| {
            (a.start, a.min_staff, a.role.as_str(), &a.id)
                .cmp(&(b.start, b.min_staff, b.role.as_str(), &b.id))
        });
        ordered
    }

    pub fn requirement(&self, id: &ShiftId) -> Option<Requirement> {
        self.shift(id).map(Shift::requirement)
    }
}

impl TryFrom<RawConstraints> for ConstraintModel {
    type Error = ModelError;

    fn try_from(raw: RawConstraints) -> Result<Self, Self::Error> {
        Self::new(raw.shifts, raw.rules)
    }
}

impl From<ConstraintModel> for RawConstraints {
    fn from(model: ConstraintModel) -> Self {
        Self {
            shifts: model.shifts,
            rules: model.rules,
        }
    }
}
