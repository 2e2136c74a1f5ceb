use crate::solver::VarHandle;

/// Dense handle storage addressed by (employee, date, role) and (employee, date) indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableGrid {
    employees: usize,
    dates: usize,
    roles: usize,
    assign: Vec<VarHandle>,
    load: Vec<VarHandle>,
}

impl VariableGrid {
    pub(crate) fn with_capacity(employees: usize, dates: usize, roles: usize) -> Self {
        Self {
            employees,
            dates,
            roles,
            assign: Vec::with_capacity(employees * dates * roles),
            load: Vec::with_capacity(employees * dates),
        }
    }

    pub(crate) fn push_assign(&mut self, handle: VarHandle) {
        self.assign.push(handle);
    }

    pub(crate) fn push_load(&mut self, handle: VarHandle) {
        self.load.push(handle);
    }

    pub fn employees(&self) -> usize {
        self.employees
    }

    pub fn dates(&self) -> usize {
        self.dates
    }

    pub fn roles(&self) -> usize {
        self.roles
    }

    pub fn assign(&self, employee: usize, date: usize, role: usize) -> VarHandle {
        self.assign[(employee * self.dates + date) * self.roles + role]
    }

    pub fn load(&self, employee: usize, date: usize) -> VarHandle {
        self.load[employee * self.dates + date]
    }

    pub fn assign_handles(&self) -> &[VarHandle] {
        &self.assign
    }

    pub fn load_handles(&self) -> &[VarHandle] {
        &self.load
    }
}
