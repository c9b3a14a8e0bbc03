//! Clinic staff and back-office accounts

use super::macros::impl_record;
use uuid::Uuid;

impl_record!(
    Specialization {
        singular: "specialization",
        plural: "specializations",
        label: "Specialization",
        permission: "SPECIALIZATION",
        search: ["name"],
        relations: [],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 120))]
        name: String,
        description: Option<String>,
    }
);

impl_record!(
    /// Non-medical staff member
    Employee {
        singular: "employee",
        plural: "employees",
        label: "Employee",
        permission: "EMPLOYEE",
        search: ["name", "email", "phone", "position"],
        relations: ["clinic" => "clinics", "department" => "departments"],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(length(max = 30))]
        phone: Option<String>,
        #[validate(length(min = 1, max = 120))]
        position: String,
        clinic: Uuid,
        department: Option<Uuid>,
        #[serde(default = "crate::entities::default_active")]
        is_active: bool,
    }
);

impl_record!(
    Doctor {
        singular: "doctor",
        plural: "doctors",
        label: "Doctor",
        permission: "DOCTOR",
        search: ["name", "email", "phone"],
        relations: [
            "clinic" => "clinics",
            "department" => "departments",
            "specialization" => "specializations",
        ],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        #[validate(email)]
        email: String,
        #[validate(length(max = 30))]
        phone: Option<String>,
        clinic: Uuid,
        department: Option<Uuid>,
        specialization: Option<Uuid>,
        #[validate(range(min = 0.0))]
        consultation_fee: Option<f64>,
        #[serde(default = "crate::entities::default_active")]
        is_active: bool,
    }
);

impl_record!(
    /// Named bundle of permission tokens
    Role {
        singular: "role",
        plural: "roles",
        label: "Role",
        permission: "ROLE",
        search: ["name"],
        relations: [],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 80))]
        name: String,
        description: Option<String>,
        #[serde(default)]
        permissions: Vec<String>,
    }
);

impl_record!(
    /// Back-office account
    User {
        singular: "user",
        plural: "users",
        label: "User",
        permission: "USER",
        search: ["name", "email"],
        relations: ["role" => "roles"],
        date_field: "createdAt",
    }
    {
        #[validate(length(min = 1, max = 200))]
        name: String,
        #[validate(email)]
        email: String,
        role: Option<Uuid>,
        #[serde(default = "crate::entities::default_active")]
        is_active: bool,
    }
);
