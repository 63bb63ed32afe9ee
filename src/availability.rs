//! Stock des disponibilités : employés, rôles et fenêtres déclarées.
//!
//! Données pures. L'insertion valide chaque fenêtre ; la désérialisation
//! repasse par la même validation.

use crate::model::{AvailabilityWindow, Employee, EmployeeId, Interval, ModelError, Role};
use serde::{Deserialize, Serialize};

/// Instantané des employés pour une période, trié par identifiant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Employee>", into = "Vec<Employee>")]
pub struct AvailabilityStore {
    employees: Vec<Employee>,
}

impl AvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_employees(employees: Vec<Employee>) -> Result<Self, ModelError> {
        let mut store = Self::new();
        for employee in employees {
            store.insert_employee(employee)?;
        }
        Ok(store)
    }

    /// Ajoute un employé ; ses fenêtres éventuelles sont validées et triées.
    pub fn insert_employee(&mut self, mut employee: Employee) -> Result<(), ModelError> {
        let pos = match self.position(&employee.id) {
            Ok(_) => return Err(ModelError::DuplicateEmployee(employee.id.to_string())),
            Err(pos) => pos,
        };
        for window in &employee.windows {
            window.check()?;
        }
        sort_windows(&mut employee.windows);
        self.employees.insert(pos, employee);
        Ok(())
    }

    pub fn insert_window(
        &mut self,
        employee: &EmployeeId,
        window: AvailabilityWindow,
    ) -> Result<(), ModelError> {
        window.check()?;
        let pos = self
            .position(employee)
            .map_err(|_| ModelError::UnknownEmployee(employee.to_string()))?;
        let windows = &mut self.employees[pos].windows;
        windows.push(window);
        sort_windows(windows);
        Ok(())
    }

    /// Remplace la fiche d'un employé existant ; les fenêtres de la nouvelle
    /// fiche sont revalidées. Renvoie l'ancienne fiche.
    pub fn replace_employee(&mut self, mut employee: Employee) -> Result<Employee, ModelError> {
        let pos = self
            .position(&employee.id)
            .map_err(|_| ModelError::UnknownEmployee(employee.id.to_string()))?;
        for window in &employee.windows {
            window.check()?;
        }
        sort_windows(&mut employee.windows);
        Ok(std::mem::replace(&mut self.employees[pos], employee))
    }

    /// Retire un employé et toutes ses fenêtres.
    pub fn remove_employee(&mut self, id: &EmployeeId) -> Result<Employee, ModelError> {
        let pos = self
            .position(id)
            .map_err(|_| ModelError::UnknownEmployee(id.to_string()))?;
        Ok(self.employees.remove(pos))
    }

    /// Vide les fenêtres d'un employé ; renvoie le nombre supprimé.
    pub fn clear_windows(&mut self, id: &EmployeeId) -> Result<usize, ModelError> {
        let pos = self
            .position(id)
            .map_err(|_| ModelError::UnknownEmployee(id.to_string()))?;
        Ok(self.employees[pos].windows.drain(..).count())
    }

    pub fn clear_all_windows(&mut self) -> usize {
        self.employees
            .iter_mut()
            .map(|e| e.windows.drain(..).count())
            .sum()
    }

    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.position(id).ok().map(|pos| &self.employees[pos])
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn len(&self) -> usize {
        self.employees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Fenêtres d'un employé pour un rôle, en ordre chronologique.
    pub fn windows_for<'a>(
        &'a self,
        employee: &EmployeeId,
        role: &'a Role,
    ) -> impl Iterator<Item = &'a AvailabilityWindow> + 'a {
        self.employee(employee)
            .into_iter()
            .flat_map(|e| e.windows.iter())
            .filter(move |w| &w.role == role)
    }

    /// Vrai ssi `interval` est entièrement couvert par l'union des fenêtres
    /// de l'employé pour ce rôle. Un recouvrement partiel ne suffit pas.
    pub fn is_available(&self, employee: &EmployeeId, role: &Role, interval: &Interval) -> bool {
        covers(self.windows_for(employee, role), interval)
    }

    fn position(&self, id: &EmployeeId) -> Result<usize, usize> {
        self.employees.binary_search_by(|e| e.id.cmp(id))
    }
}

impl TryFrom<Vec<Employee>> for AvailabilityStore {
    type Error = ModelError;

    fn try_from(employees: Vec<Employee>) -> Result<Self, Self::Error> {
        Self::from_employees(employees)
    }
}

impl From<AvailabilityStore> for Vec<Employee> {
    fn from(store: AvailabilityStore) -> Self {
        store.employees
    }
}

fn sort_windows(windows: &mut [AvailabilityWindow]) {
    windows.sort_by(|a, b| (&a.role, a.start, a.end).cmp(&(&b.role, b.start, b.end)));
}

/// Balayage des fenêtres triées par début : on avance un curseur tant
/// qu'aucun trou n'apparaît avant la fin de l'intervalle.
fn covers<'a, I>(windows: I, interval: &Interval) -> bool
where
    I: IntoIterator<Item = &'a AvailabilityWindow>,
{
    let mut cursor = interval.start;
    for window in windows {
        if cursor >= interval.end {
            break;
        }
        if window.start > cursor {
            return false;
        }
        if window.end > cursor {
            cursor = window.end;
        }
    }
    cursor >= interval.end
}
