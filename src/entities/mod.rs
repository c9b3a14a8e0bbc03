//! Clinic record types and the module registering them

mod macros;

pub mod care;
pub mod organization;
pub mod staff;

pub use care::{Appointment, AppointmentStatus, MedicalRecord, Patient, Service};
pub use organization::{Clinic, ClinicCollection, Company, Department};
pub use staff::{Doctor, Employee, Role, Specialization, User};

use crate::core::module::Module;
use crate::server::entity_registry::{EntityRegistry, RecordDescriptor};

pub(crate) fn default_active() -> bool {
    true
}

/// Every record type of the back office
pub struct ClinicModule;

impl Module for ClinicModule {
    fn name(&self) -> &str {
        "clinic"
    }

    fn entity_types(&self) -> Vec<&str> {
        vec![
            "company",
            "clinic_collection",
            "clinic",
            "department",
            "specialization",
            "service",
            "employee",
            "doctor",
            "patient",
            "appointment",
            "medical_record",
            "role",
            "user",
        ]
    }

    fn register_entities(&self, registry: &mut EntityRegistry) {
        registry.register(Box::new(RecordDescriptor::<Company>::new()));
        registry.register(Box::new(RecordDescriptor::<ClinicCollection>::new()));
        registry.register(Box::new(RecordDescriptor::<Clinic>::new()));
        registry.register(Box::new(RecordDescriptor::<Department>::new()));
        registry.register(Box::new(RecordDescriptor::<Specialization>::new()));
        registry.register(Box::new(RecordDescriptor::<Service>::new()));
        registry.register(Box::new(RecordDescriptor::<Employee>::new()));
        registry.register(Box::new(RecordDescriptor::<Doctor>::new()));
        registry.register(Box::new(RecordDescriptor::<Patient>::new()));
        registry.register(Box::new(RecordDescriptor::<Appointment>::new()));
        registry.register(Box::new(RecordDescriptor::<MedicalRecord>::new()));
        registry.register(Box::new(RecordDescriptor::<Role>::new()));
        registry.register(Box::new(RecordDescriptor::<User>::new()));
    }
}
