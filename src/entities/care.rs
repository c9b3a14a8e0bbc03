//! Patients, the services offered to them and their visits

use super::macros::impl_record;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an appointment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl_record!(
    Patient {
        singular: "patient",
        plural: "patients",
        label: "Patient",
        permission: "PATIENT",
        search: ["name", "email", "phone"],
        relations: [],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        #[validate(email)]
        email: Option<String>,
        #[validate(length(max = 30))]
        phone: Option<String>,
        date_of_birth: Option<NaiveDate>,
        gender: Option<String>,
        address: Option<String>,
    }
);

impl_record!(
    /// Billable service offered by a department
    Service {
        singular: "service",
        plural: "services",
        label: "Service",
        permission: "SERVICE",
        search: ["name"],
        relations: ["department" => "departments"],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        description: Option<String>,
        #[validate(range(min = 0.0))]
        price: f64,
        #[validate(range(min = 1, max = 1440))]
        duration_minutes: Option<u32>,
        department: Uuid,
    }
);

impl_record!(
    Appointment {
        singular: "appointment",
        plural: "appointments",
        label: "Appointment",
        permission: "APPOINTMENT",
        search: ["notes"],
        relations: [
            "patient" => "patients",
            "doctor" => "doctors",
            "clinic" => "clinics",
            "service" => "services",
        ],
        date_field: "appointmentDate",
    }
    {
        patient: Uuid,
        doctor: Uuid,
        clinic: Uuid,
        service: Option<Uuid>,
        #[serde(with = "crate::core::timestamp")]
        appointment_date: DateTime<Utc>,
        #[serde(default)]
        status: AppointmentStatus,
        #[validate(length(max = 2000))]
        notes: Option<String>,
    }
);

impl_record!(
    MedicalRecord {
        singular: "medical_record",
        plural: "medical_records",
        label: "Medical record",
        permission: "MEDICAL_RECORD",
        search: ["diagnosis", "treatment"],
        relations: [
            "patient" => "patients",
            "doctor" => "doctors",
            "appointment" => "appointments",
        ],
        date_field: "visitDate",
    }
    {
        patient: Uuid,
        doctor: Uuid,
        appointment: Option<Uuid>,
        #[serde(with = "crate::core::timestamp")]
        visit_date: DateTime<Utc>,
        #[validate(length(min = 1, max = 2000))]
        diagnosis: String,
        treatment: Option<String>,
        prescription: Option<String>,
    }
);
