use serde::Serialize;

/// Dashboard counters, computed on demand from the live collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    pub total_patients: usize,
    pub total_doctors: usize,
    pub total_appointments: usize,
    pub appointments_today: usize,
    pub appointments_scheduled: usize,
    pub appointments_completed: usize,
}
