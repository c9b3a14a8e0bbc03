//! Macro for reducing boilerplate when defining record types
//!
//! Generates the struct (with `id`, `createdAt` and `updatedAt` injected),
//! its `Entity` implementation and a constructor.

/// Define a record type and its static metadata
///
/// # Example
///
/// ```rust,ignore
/// impl_record!(
///     /// A treatment room
///     Room {
///         singular: "room",
///         plural: "rooms",
///         label: "Room",
///         permission: "ROOM",
///         search: ["name"],
///         relations: ["clinic" => "clinics"],
///         date_field: "createdAt",
///     }
///     {
///         #[validate(length(min = 1, max = 100))]
///         name: String,
///         clinic: Uuid,
///     }
/// );
/// ```
///
/// `permission` yields the tokens `READ_ROOM`, `CREATE_ROOM`, `UPDATE_ROOM`
/// and `DELETE_ROOM`.
macro_rules! impl_record {
    (
        $(#[$meta:meta])*
        $type:ident {
            singular: $singular:literal,
            plural: $plural:literal,
            label: $label:literal,
            permission: $permission:literal,
            search: [ $( $search:literal ),* $(,)? ],
            relations: [ $( $rel_field:literal => $rel_collection:literal ),* $(,)? ],
            date_field: $date_field:literal $(,)?
        }
        {
            $( $(#[$field_meta:meta])* $field:ident : $field_type:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize, ::validator::Validate)]
        #[serde(rename_all = "camelCase")]
        pub struct $type {
            /// Unique identifier
            pub id: ::uuid::Uuid,

            /// When this record was created
            #[serde(with = "crate::core::timestamp")]
            pub created_at: ::chrono::DateTime<::chrono::Utc>,

            /// When this record was last updated
            #[serde(with = "crate::core::timestamp")]
            pub updated_at: ::chrono::DateTime<::chrono::Utc>,

            $( $(#[$field_meta])* pub $field : $field_type ),*
        }

        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn display_name() -> &'static str {
                $label
            }

            fn searchable_fields() -> &'static [&'static str] {
                &[ $( $search ),* ]
            }

            fn relations() -> &'static [$crate::core::store::Relation] {
                const RELATIONS: &[$crate::core::store::Relation] = &[
                    $( $crate::core::store::Relation::new($rel_field, $rel_collection) ),*
                ];
                RELATIONS
            }

            fn date_field() -> &'static str {
                $date_field
            }

            fn required_permissions(
                operation: $crate::core::auth::Operation,
            ) -> $crate::core::auth::RequiredPermissions {
                use $crate::core::auth::{Operation, RequiredPermissions};
                match operation {
                    Operation::List | Operation::Get => {
                        RequiredPermissions(&[concat!("READ_", $permission)])
                    }
                    Operation::Create => RequiredPermissions(&[concat!("CREATE_", $permission)]),
                    Operation::Update => RequiredPermissions(&[concat!("UPDATE_", $permission)]),
                    Operation::Delete => RequiredPermissions(&[concat!("DELETE_", $permission)]),
                }
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }
        }

        impl $type {
            /// Create a new record with a fresh id, stamped now
            #[allow(clippy::too_many_arguments)]
            pub fn new( $( $field : $field_type ),* ) -> Self {
                let now = ::chrono::Utc::now();
                Self {
                    id: ::uuid::Uuid::new_v4(),
                    created_at: now,
                    updated_at: now,
                    $( $field ),*
                }
            }
        }
    };
}

pub(crate) use impl_record;
