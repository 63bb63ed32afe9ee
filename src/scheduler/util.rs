use crate::model::{EmployeeId, Interval};
use std::collections::HashMap;

/// Compteurs d'un employé pendant une génération.
#[derive(Debug, Default, Clone)]
pub(super) struct Load {
    pub minutes: i64,
    pub shifts: u32,
    pub intervals: Vec<Interval>,
}

/// État de travail propre à un appel de génération, jamais partagé.
#[derive(Debug, Default)]
pub(super) struct Ledger {
    loads: HashMap<EmployeeId, Load>,
}

impl Ledger {
    pub fn load(&self, employee: &EmployeeId) -> Option<&Load> {
        self.loads.get(employee)
    }

    pub fn minutes(&self, employee: &EmployeeId) -> i64 {
        self.load(employee).map_or(0, |l| l.minutes)
    }

    pub fn shift_count(&self, employee: &EmployeeId) -> u32 {
        self.load(employee).map_or(0, |l| l.shifts)
    }

    pub fn overlaps(&self, employee: &EmployeeId, interval: &Interval) -> bool {
        self.load(employee)
            .is_some_and(|l| l.intervals.iter().any(|i| i.overlaps(interval)))
    }

    pub fn record(&mut self, employee: &EmployeeId, interval: Interval) {
        let load = self.loads.entry(employee.clone()).or_default();
        load.minutes += interval.duration_minutes();
        load.shifts += 1;
        load.intervals.push(interval);
    }

    /// Annule un `record` ; sans effet si l'intervalle n'était pas inscrit.
    pub fn remove(&mut self, employee: &EmployeeId, interval: Interval) {
        let Some(load) = self.loads.get_mut(employee) else {
            return;
        };
        if let Some(i) = load.intervals.iter().position(|x| *x == interval) {
            load.intervals.swap_remove(i);
            load.minutes -= interval.duration_minutes();
            load.shifts -= 1;
        }
    }
}
