use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Erreurs de construction du modèle : rejetées avant tout moteur.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid availability window: {0}")]
    InvalidWindow(String),
    #[error("invalid shift: {0}")]
    InvalidShift(String),
    #[error("duplicate employee id: {0}")]
    DuplicateEmployee(String),
    #[error("duplicate shift id: {0}")]
    DuplicateShift(String),
    #[error("unknown employee: {0}")]
    UnknownEmployee(String),
    #[error("unknown shift: {0}")]
    UnknownShift(String),
    #[error("duplicate assignment: {0}")]
    DuplicateAssignment(String),
}

/// Identifiant fort pour Employee (ordre total, sert de départage final)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(String);

impl EmployeeId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Qualification nommée (ex. "Cashier").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role(String);

impl Role {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().trim().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Intervalle UTC semi-ouvert `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Les bornes qui se touchent ne se chevauchent pas.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Fenêtre de disponibilité d'un employé pour un rôle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub role: Role,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AvailabilityWindow {
    pub fn new(role: Role, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ModelError> {
        let window = Self { role, start, end };
        window.check()?;
        Ok(window)
    }

    pub(crate) fn check(&self) -> Result<(), ModelError> {
        if self.end <= self.start {
            return Err(ModelError::InvalidWindow(format!(
                "{} {} → {}: end must be strictly after start",
                self.role,
                self.start.to_rfc3339(),
                self.end.to_rfc3339()
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}

/// Employé : rôles tenus, disponibilités, plafond d'heures éventuel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub windows: Vec<AvailabilityWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hours: Option<u32>,
}

impl Employee {
    pub fn new<I: Into<EmployeeId>, N: Into<String>>(id: I, name: N) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            roles: BTreeSet::new(),
            windows: Vec::new(),
            max_hours: None,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn with_max_hours(mut self, hours: u32) -> Self {
        self.max_hours = Some(hours);
        self
    }

    pub fn holds(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }
}

impl From<&str> for EmployeeId {
    fn from(s: &str) -> Self {
        EmployeeId::new(s)
    }
}

impl From<String> for EmployeeId {
    fn from(s: String) -> Self {
        EmployeeId(s)
    }
}

/// Identifiant fort pour Shift
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Bande d'effectif requise `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub min: u32,
    pub max: u32,
}

/// Créneau à pourvoir (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub id: ShiftId,
    pub name: String,
    pub role: Role,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min_staff: u32,
    pub max_staff: u32,
}

impl Shift {
    /// Crée un shift en validant `end > start` et `min_staff <= max_staff`.
    /// `max_staff` vaut `min_staff` s'il est omis.
    pub fn new(
        name: String,
        role: Role,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        min_staff: u32,
        max_staff: Option<u32>,
    ) -> Result<Self, ModelError> {
        let shift = Self {
            id: ShiftId::random(),
            name,
            role,
            start,
            end,
            min_staff,
            max_staff: max_staff.unwrap_or(min_staff),
        };
        shift.check()?;
        Ok(shift)
    }

    pub fn with_id(mut self, id: ShiftId) -> Self {
        self.id = id;
        self
    }

    pub(crate) fn check(&self) -> Result<(), ModelError> {
        if self.end <= self.start {
            return Err(ModelError::InvalidShift(format!(
                "{}: end must be strictly after start",
                self.name
            )));
        }
        if self.min_staff > self.max_staff {
            return Err(ModelError::InvalidShift(format!(
                "{}: min_staff {} exceeds max_staff {}",
                self.name, self.min_staff, self.max_staff
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }

    pub fn requirement(&self) -> Requirement {
        Requirement {
            min: self.min_staff,
            max: self.max_staff,
        }
    }

    /// Durée en minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Un employé qui tient une unité d'un créneau.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Assignment {
    pub employee: EmployeeId,
    pub shift: ShiftId,
}

impl Assignment {
    pub fn new(employee: EmployeeId, shift: ShiftId) -> Self {
        Self { employee, shift }
    }
}
