//! Companies and the clinics, collections and departments they run

use super::macros::impl_record;
use uuid::Uuid;

impl_record!(
    /// Legal entity owning one or more clinic collections
    Company {
        singular: "company",
        plural: "companies",
        label: "Company",
        permission: "COMPANY",
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
        address: Option<String>,
        #[serde(default = "crate::entities::default_active")]
        is_active: bool,
    }
);

impl_record!(
    /// Brand or group of clinics inside a company
    ClinicCollection {
        singular: "clinic_collection",
        plural: "clinic_collections",
        label: "Clinic collection",
        permission: "CLINIC_COLLECTION",
        search: ["name"],
        relations: ["company" => "companies"],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        description: Option<String>,
        company: Uuid,
    }
);

impl_record!(
    Clinic {
        singular: "clinic",
        plural: "clinics",
        label: "Clinic",
        permission: "CLINIC",
        search: ["name", "address", "phone"],
        relations: ["clinicCollection" => "clinic_collections"],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        #[validate(length(min = 1, max = 500))]
        address: String,
        #[validate(length(max = 30))]
        phone: Option<String>,
        #[validate(email)]
        email: Option<String>,
        clinic_collection: Uuid,
        #[serde(default = "crate::entities::default_active")]
        is_active: bool,
    }
);

impl_record!(
    Department {
        singular: "department",
        plural: "departments",
        label: "Department",
        permission: "DEPARTMENT",
        search: ["name"],
        relations: ["clinic" => "clinics"],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        description: Option<String>,
        clinic: Uuid,
    }
);
