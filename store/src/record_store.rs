use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info};

use models::appointment::{Appointment, NewAppointment};
use models::doctor::{Doctor, NewDoctor};
use models::errors::{Entity, StoreError, StoreResult, ValidationError};
use models::patient::{NewPatient, Patient, PatientUpdate};
use models::statistics::Statistics;
use models::status::AppointmentStatus;

/// Monotonic identifier sequence. Starts at 1 and never hands out the same
/// value twice, so identifiers are not reused after a delete.
#[derive(Debug, Default)]
struct IdSequence(i32);

impl IdSequence {
    fn next(&mut self) -> i32 {
        self.0 += 1;
        self.0
    }
}

/// The in-memory authority over the patient, doctor and appointment
/// collections: identifier assignment, referential validation, status
/// transitions and dashboard statistics all live here.
///
/// The store itself is single-threaded (`&mut self` mutation); callers that
/// share it across tasks serialize access — the REST API keeps it behind a
/// `tokio::sync::Mutex`. Nothing is persisted: a restart loses everything.
///
/// Deleting a patient that an appointment still references is allowed and
/// leaves the appointment dangling. Referential checks apply at appointment
/// creation only.
#[derive(Debug, Default)]
pub struct RecordStore {
    patients: Vec<Patient>,
    doctors: Vec<Doctor>,
    appointments: Vec<Appointment>,
    patient_ids: IdSequence,
    doctor_ids: IdSequence,
    appointment_ids: IdSequence,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-loaded with the demo fixtures: two patients, two doctors
    /// and one scheduled teleconsultation two days out.
    pub fn with_seed_data() -> Self {
        let mut store = Self::new();
        let now = Utc::now();

        let id = store.patient_ids.next();
        store.patients.push(Patient {
            id,
            name: "João Silva".to_string(),
            email: "joao.silva@email.com".to_string(),
            phone: "(11) 98765-4321".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1985, 5, 15).expect("valid date"),
            registered_at: now - Duration::days(30),
        });
        let id = store.patient_ids.next();
        store.patients.push(Patient {
            id,
            name: "Maria Santos".to_string(),
            email: "maria.santos@email.com".to_string(),
            phone: "(11) 97654-3210".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 8, 22).expect("valid date"),
            registered_at: now - Duration::days(15),
        });

        let id = store.doctor_ids.next();
        store.doctors.push(Doctor {
            id,
            name: "Dr. Carlos Mendes".to_string(),
            license_number: "123456-SP".to_string(),
            specialty: "Cardiology".to_string(),
            email: "carlos.mendes@healthflow.com".to_string(),
            phone: "(11) 3456-7890".to_string(),
            available: true,
        });
        let id = store.doctor_ids.next();
        store.doctors.push(Doctor {
            id,
            name: "Dra. Ana Paula".to_string(),
            license_number: "789012-SP".to_string(),
            specialty: "General Practice".to_string(),
            email: "ana.paula@healthflow.com".to_string(),
            phone: "(11) 3456-7891".to_string(),
            available: true,
        });

        let id = store.appointment_ids.next();
        store.appointments.push(Appointment {
            id,
            patient_id: 1,
            doctor_id: 1,
            scheduled_at: (now + Duration::days(2))
                .date_naive()
                .and_hms_opt(14, 0, 0)
                .expect("valid time")
                .and_utc(),
            appointment_type: "Teleconsultation".to_string(),
            status: AppointmentStatus::Scheduled,
            notes: Some("Routine check-up".to_string()),
            created_at: now,
        });

        info!(
            patients = store.patients.len(),
            doctors = store.doctors.len(),
            appointments = store.appointments.len(),
            "seeded record store with demo data"
        );
        store
    }

    // ---- Patients ----

    /// All patients, in insertion order.
    pub fn list_patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn get_patient(&self, id: i32) -> StoreResult<&Patient> {
        self.patients
            .iter()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(Entity::Patient, id))
    }

    pub fn create_patient(&mut self, input: NewPatient) -> Patient {
        let patient = Patient {
            id: self.patient_ids.next(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            date_of_birth: input.date_of_birth,
            registered_at: Utc::now(),
        };
        info!(id = patient.id, "registered patient");
        self.patients.push(patient.clone());
        patient
    }

    /// Overwrites the mutable patient fields in place. Identifier and
    /// registration timestamp stay as they were.
    pub fn update_patient(&mut self, id: i32, input: PatientUpdate) -> StoreResult<Patient> {
        let patient = self
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(Entity::Patient, id))?;
        patient.name = input.name;
        patient.email = input.email;
        patient.phone = input.phone;
        patient.date_of_birth = input.date_of_birth;
        debug!(id, "updated patient");
        Ok(patient.clone())
    }

    pub fn delete_patient(&mut self, id: i32) -> StoreResult<()> {
        let index = self
            .patients
            .iter()
            .position(|p| p.id == id)
            .ok_or(StoreError::NotFound(Entity::Patient, id))?;
        self.patients.remove(index);
        info!(id, "removed patient");
        Ok(())
    }

    // ---- Doctors ----

    pub fn list_doctors(&self) -> &[Doctor] {
        &self.doctors
    }

    pub fn get_doctor(&self, id: i32) -> StoreResult<&Doctor> {
        self.doctors
            .iter()
            .find(|d| d.id == id)
            .ok_or(StoreError::NotFound(Entity::Doctor, id))
    }

    pub fn create_doctor(&mut self, input: NewDoctor) -> Doctor {
        let doctor = Doctor {
            id: self.doctor_ids.next(),
            name: input.name,
            license_number: input.license_number,
            specialty: input.specialty,
            email: input.email,
            phone: input.phone,
            available: input.available,
        };
        info!(id = doctor.id, "registered doctor");
        self.doctors.push(doctor.clone());
        doctor
    }

    // ---- Appointments ----

    pub fn list_appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn get_appointment(&self, id: i32) -> StoreResult<&Appointment> {
        self.appointments
            .iter()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(Entity::Appointment, id))
    }

    /// Books an appointment. Both referenced records must exist at this
    /// moment; a failed check leaves the collection untouched.
    pub fn create_appointment(&mut self, input: NewAppointment) -> StoreResult<Appointment> {
        if !self.patients.iter().any(|p| p.id == input.patient_id) {
            return Err(ValidationError::PatientNotFound(input.patient_id).into());
        }
        if !self.doctors.iter().any(|d| d.id == input.doctor_id) {
            return Err(ValidationError::DoctorNotFound(input.doctor_id).into());
        }
        if let Some(requested) = &input.status {
            debug!(%requested, "ignoring client-supplied status, new appointments start Scheduled");
        }
        let appointment = Appointment {
            id: self.appointment_ids.next(),
            patient_id: input.patient_id,
            doctor_id: input.doctor_id,
            scheduled_at: input.scheduled_at,
            appointment_type: input.appointment_type,
            status: AppointmentStatus::Scheduled,
            notes: input.notes,
            created_at: Utc::now(),
        };
        info!(
            id = appointment.id,
            patient_id = appointment.patient_id,
            doctor_id = appointment.doctor_id,
            "booked appointment"
        );
        self.appointments.push(appointment.clone());
        Ok(appointment)
    }

    /// Moves an appointment to `new_status`. Any recognized status may follow
    /// any other; an unrecognized string is rejected without touching the
    /// record.
    pub fn transition_appointment_status(
        &mut self,
        id: i32,
        new_status: &str,
    ) -> StoreResult<Appointment> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(StoreError::NotFound(Entity::Appointment, id))?;
        let status: AppointmentStatus = new_status.parse()?;
        appointment.status = status;
        info!(id, status = %status, "appointment status changed");
        Ok(appointment.clone())
    }

    // ---- Statistics ----

    /// Counts evaluated against the wall-clock date at call time.
    pub fn statistics(&self) -> Statistics {
        self.statistics_at(Utc::now().date_naive())
    }

    fn statistics_at(&self, today: NaiveDate) -> Statistics {
        Statistics {
            total_patients: self.patients.len(),
            total_doctors: self.doctors.len(),
            total_appointments: self.appointments.len(),
            appointments_today: self
                .appointments
                .iter()
                .filter(|a| a.scheduled_at.date_naive() == today)
                .count(),
            appointments_scheduled: self
                .appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Scheduled)
                .count(),
            appointments_completed: self
                .appointments
                .iter()
                .filter(|a| a.status == AppointmentStatus::Completed)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RecordStore;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use models::appointment::NewAppointment;
    use models::doctor::NewDoctor;
    use models::errors::{Entity, StoreError, ValidationError};
    use models::patient::{NewPatient, PatientUpdate};
    use models::status::AppointmentStatus;

    fn new_patient(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            phone: "(11) 90000-0000".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
        }
    }

    fn new_doctor(name: &str) -> NewDoctor {
        NewDoctor {
            name: name.to_string(),
            license_number: "000000-SP".to_string(),
            specialty: "General Practice".to_string(),
            email: format!("{}@healthflow.com", name.to_lowercase().replace(' ', ".")),
            phone: "(11) 3000-0000".to_string(),
            available: true,
        }
    }

    fn new_appointment(patient_id: i32, doctor_id: i32) -> NewAppointment {
        NewAppointment {
            patient_id,
            doctor_id,
            scheduled_at: Utc::now() + Duration::days(1),
            appointment_type: "Teleconsultation".to_string(),
            status: None,
            notes: None,
        }
    }

    #[test]
    fn should_assign_sequential_identifiers_starting_at_one() {
        let mut store = RecordStore::new();
        for n in 1..=5 {
            let patient = store.create_patient(new_patient("Ana"));
            assert_eq!(patient.id, n);
        }
    }

    #[test]
    fn should_return_created_patient_on_lookup() {
        let mut store = RecordStore::new();
        let created = store.create_patient(new_patient("Ana Costa"));
        let fetched = store.get_patient(created.id).unwrap();
        assert_eq!(*fetched, created);
    }

    #[test]
    fn should_report_not_found_after_delete() {
        let mut store = RecordStore::new();
        let patient = store.create_patient(new_patient("Ana"));
        store.delete_patient(patient.id).unwrap();
        assert_eq!(
            store.get_patient(patient.id).unwrap_err(),
            StoreError::NotFound(Entity::Patient, patient.id)
        );
    }

    #[test]
    fn should_leave_collection_unchanged_when_deleting_unknown_id() {
        let mut store = RecordStore::new();
        store.create_patient(new_patient("Ana"));
        let result = store.delete_patient(99);
        assert_eq!(result.unwrap_err(), StoreError::NotFound(Entity::Patient, 99));
        assert_eq!(store.list_patients().len(), 1);
    }

    #[test]
    fn should_not_reuse_identifiers_after_delete() {
        let mut store = RecordStore::new();
        store.create_patient(new_patient("Ana"));
        let second = store.create_patient(new_patient("Bia"));
        store.delete_patient(second.id).unwrap();
        let third = store.create_patient(new_patient("Clara"));
        assert_eq!(third.id, 3);
    }

    #[test]
    fn should_overwrite_mutable_fields_and_keep_identity_on_update() {
        let mut store = RecordStore::new();
        let created = store.create_patient(new_patient("Ana"));
        let updated = store
            .update_patient(
                created.id,
                PatientUpdate {
                    name: "Ana Souza".to_string(),
                    email: "ana.souza@example.com".to_string(),
                    phone: "(11) 91111-1111".to_string(),
                    date_of_birth: NaiveDate::from_ymd_opt(1981, 2, 2).unwrap(),
                },
            )
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.registered_at, created.registered_at);
        assert_eq!(updated.name, "Ana Souza");
        assert_eq!(store.get_patient(created.id).unwrap().name, "Ana Souza");
    }

    #[test]
    fn should_report_not_found_when_updating_unknown_patient() {
        let mut store = RecordStore::new();
        let result = store.update_patient(
            1,
            PatientUpdate {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: "(11) 90000-0000".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1980, 1, 1).unwrap(),
            },
        );
        assert_eq!(result.unwrap_err(), StoreError::NotFound(Entity::Patient, 1));
    }

    #[test]
    fn should_default_doctor_availability_to_true() {
        let mut store = RecordStore::new();
        let doctor = store.create_doctor(new_doctor("Dr. Lima"));
        assert!(store.get_doctor(doctor.id).unwrap().available);
    }

    #[test]
    fn should_reject_appointment_for_unknown_patient() {
        let mut store = RecordStore::new();
        let doctor = store.create_doctor(new_doctor("Dr. Lima"));
        let result = store.create_appointment(new_appointment(42, doctor.id));
        assert_eq!(
            result.unwrap_err(),
            StoreError::Validation(ValidationError::PatientNotFound(42))
        );
        assert!(store.list_appointments().is_empty());
    }

    #[test]
    fn should_reject_appointment_for_unknown_doctor() {
        let mut store = RecordStore::new();
        let patient = store.create_patient(new_patient("Ana"));
        let result = store.create_appointment(new_appointment(patient.id, 42));
        assert_eq!(
            result.unwrap_err(),
            StoreError::Validation(ValidationError::DoctorNotFound(42))
        );
        assert!(store.list_appointments().is_empty());
    }

    #[test]
    fn should_force_new_appointments_to_scheduled() {
        let mut store = RecordStore::new();
        let patient = store.create_patient(new_patient("Ana"));
        let doctor = store.create_doctor(new_doctor("Dr. Lima"));
        let mut input = new_appointment(patient.id, doctor.id);
        input.status = Some("Completed".to_string());
        let appointment = store.create_appointment(input).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    }

    #[test]
    fn should_allow_any_recognized_status_to_follow_any_other() {
        let mut store = RecordStore::new();
        let patient = store.create_patient(new_patient("Ana"));
        let doctor = store.create_doctor(new_doctor("Dr. Lima"));
        let appointment = store
            .create_appointment(new_appointment(patient.id, doctor.id))
            .unwrap();
        for status in ["Completed", "InProgress", "Cancelled", "Scheduled"] {
            let updated = store
                .transition_appointment_status(appointment.id, status)
                .unwrap();
            assert_eq!(updated.status.as_str(), status);
        }
    }

    #[test]
    fn should_reject_invalid_status_and_leave_record_unchanged() {
        let mut store = RecordStore::new();
        let patient = store.create_patient(new_patient("Ana"));
        let doctor = store.create_doctor(new_doctor("Dr. Lima"));
        let appointment = store
            .create_appointment(new_appointment(patient.id, doctor.id))
            .unwrap();
        let result = store.transition_appointment_status(appointment.id, "Invalid");
        assert_eq!(
            result.unwrap_err(),
            StoreError::Validation(ValidationError::InvalidStatus("Invalid".to_string()))
        );
        assert_eq!(
            store.get_appointment(appointment.id).unwrap().status,
            AppointmentStatus::Scheduled
        );
    }

    #[test]
    fn should_report_not_found_before_validating_status() {
        let mut store = RecordStore::new();
        let result = store.transition_appointment_status(7, "Invalid");
        assert_eq!(
            result.unwrap_err(),
            StoreError::NotFound(Entity::Appointment, 7)
        );
    }

    #[test]
    fn should_allow_deleting_patient_referenced_by_appointment() {
        // Dangling references are permitted; the appointment stays behind.
        let mut store = RecordStore::new();
        let patient = store.create_patient(new_patient("Ana"));
        let doctor = store.create_doctor(new_doctor("Dr. Lima"));
        let appointment = store
            .create_appointment(new_appointment(patient.id, doctor.id))
            .unwrap();
        store.delete_patient(patient.id).unwrap();
        assert!(store.get_appointment(appointment.id).is_ok());
    }

    #[test]
    fn should_return_zero_statistics_for_empty_store() {
        let store = RecordStore::new();
        let stats = store.statistics();
        assert_eq!(stats.total_patients, 0);
        assert_eq!(stats.total_doctors, 0);
        assert_eq!(stats.total_appointments, 0);
        assert_eq!(stats.appointments_today, 0);
        assert_eq!(stats.appointments_scheduled, 0);
        assert_eq!(stats.appointments_completed, 0);
    }

    #[test]
    fn should_count_appointments_scheduled_for_the_given_day() {
        let mut store = RecordStore::new();
        let patient = store.create_patient(new_patient("Ana"));
        let doctor = store.create_doctor(new_doctor("Dr. Lima"));
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        for (day, hour) in [(10, 9), (10, 16), (11, 9)] {
            let mut input = new_appointment(patient.id, doctor.id);
            input.scheduled_at = Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap();
            store.create_appointment(input).unwrap();
        }
        let stats = store.statistics_at(today);
        assert_eq!(stats.total_appointments, 3);
        assert_eq!(stats.appointments_today, 2);
    }

    #[test]
    fn should_run_the_seeded_booking_scenario() {
        let mut store = RecordStore::with_seed_data();
        assert_eq!(store.get_patient(2).unwrap().name, "Maria Santos");
        assert_eq!(store.get_doctor(2).unwrap().name, "Dra. Ana Paula");

        let appointment = store.create_appointment(new_appointment(2, 2)).unwrap();
        assert_eq!(appointment.id, 2);
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);

        let completed = store
            .transition_appointment_status(appointment.id, "Completed")
            .unwrap();
        assert_eq!(completed.id, appointment.id);
        assert_eq!(completed.status, AppointmentStatus::Completed);

        let stats = store.statistics();
        assert_eq!(stats.total_patients, 2);
        assert_eq!(stats.total_doctors, 2);
        assert_eq!(stats.total_appointments, 2);
        assert_eq!(stats.appointments_scheduled, 1);
        assert_eq!(stats.appointments_completed, 1);
    }
}
