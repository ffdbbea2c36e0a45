pub mod appointment;
pub mod doctor;
pub mod errors;
pub mod patient;
pub mod statistics;
pub mod status;

pub use appointment::{Appointment, NewAppointment};
pub use doctor::{Doctor, NewDoctor};
pub use errors::{Entity, StoreError, StoreResult, ValidationError};
pub use patient::{NewPatient, Patient, PatientUpdate};
pub use statistics::Statistics;
pub use status::AppointmentStatus;
