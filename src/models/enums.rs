//! Shared domain enums
//!
//! Every enum here is stored as TEXT in the database and travels as its
//! upper-case label on the wire, so the same string is used in both places.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Declares a text-backed enum with string, serde and SQLx conversions.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    _ => Err(format!("Invalid {}: {}", stringify!($name), s)),
                }
            }
        }

        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: &str = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

text_enum! {
    /// Lifecycle status of an asset
    AssetStatus {
        Available => "AVAILABLE",
        InUse => "IN_USE",
        Loaned => "LOANED",
        Repairing => "REPAIRING",
        Broken => "BROKEN",
    }
}

impl Default for AssetStatus {
    fn default() -> Self {
        AssetStatus::Available
    }
}

text_enum! {
    /// Kind of maintenance event
    MaintenanceType {
        Routine => "ROUTINE",
        Repair => "REPAIR",
    }
}

text_enum! {
    /// Borrow cycle status
    LoanStatus {
        Active => "ACTIVE",
        Returned => "RETURNED",
    }
}

text_enum! {
    /// Action recorded in the audit ledger
    AuditAction {
        Login => "LOGIN",
        Create => "CREATE",
        Update => "UPDATE",
        Delete => "DELETE",
        Mutation => "MUTATION",
        Maintenance => "MAINTENANCE",
        LoanStart => "LOAN_START",
        LoanReturn => "LOAN_RETURN",
    }
}

text_enum! {
    /// Kind of entity an audit entry targets
    EntityType {
        Asset => "Asset",
        Loan => "Loan",
        User => "User",
    }
}

text_enum! {
    /// User role
    Role {
        Admin => "ADMIN",
        Operator => "OPERATOR",
        Viewer => "VIEWER",
    }
}
