//! Moteurs d'affectation et de validation.
//!
//! Les deux moteurs sont des fonctions pures sur des instantanés
//! immuables ; l'état de travail d'une génération reste local à l'appel.

mod assignment;
mod types;
mod util;
mod validation;

pub use types::{
    GenerateOptions, Generated, IssueKind, SchedError, UnmetShift, ValidationIssue,
};

use crate::availability::AvailabilityStore;
use crate::constraints::ConstraintModel;
use crate::schedule::Schedule;

/// Scheduler : regroupe les entrées d'une exécution (aucun état caché)
#[derive(Debug, Clone, Copy)]
pub struct Scheduler<'a> {
    availability: &'a AvailabilityStore,
    constraints: &'a ConstraintModel,
    opts: GenerateOptions,
}

impl<'a> Scheduler<'a> {
    pub fn new(availability: &'a AvailabilityStore, constraints: &'a ConstraintModel) -> Self {
        Self {
            availability,
            constraints,
            opts: GenerateOptions::default(),
        }
    }

    pub fn with_options(mut self, opts: GenerateOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn generate(&self) -> Result<Generated, SchedError> {
        assignment::generate(self)
    }

    pub fn validate(&self, schedule: &Schedule) -> Vec<ValidationIssue> {
        validation::validate(schedule, self.constraints, self.availability)
    }
}

/// Planning au mieux + créneaux non pourvus.
pub fn generate(
    availability: &AvailabilityStore,
    constraints: &ConstraintModel,
) -> Result<Generated, SchedError> {
    Scheduler::new(availability, constraints).generate()
}

/// Issues ordonnées (début du créneau, puis type) pour n'importe quel planning.
pub fn validate(
    schedule: &Schedule,
    constraints: &ConstraintModel,
    availability: &AvailabilityStore,
) -> Vec<ValidationIssue> {
    validation::validate(schedule, constraints, availability)
}
