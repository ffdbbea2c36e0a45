use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::AppointmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i32,
    pub patient_id: i32,
    pub doctor_id: i32,
    pub scheduled_at: DateTime<Utc>,
    pub appointment_type: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Booking request. `patient_id` and `doctor_id` must reference existing
/// records; the store rejects the request otherwise. A client-supplied
/// `status` is accepted on the wire but ignored: new appointments always
/// start out `Scheduled`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub patient_id: i32,
    pub doctor_id: i32,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_appointment_type")]
    pub appointment_type: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_appointment_type() -> String {
    "Teleconsultation".to_string()
}
