// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed identifiers backed by UUIDs.

/// Define a newtype ID wrapper around [`uuid::Uuid`].
///
/// Generates `new()` for random v4 generation, `nil()`, `as_uuid()`,
/// `Display`, `FromStr`, `From<Uuid>`, and transparent serde.
///
/// ```ignore
/// define_uuid_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId;
/// }
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random ID.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// The all-zero ID.
            pub const fn nil() -> Self {
                Self(uuid::Uuid::nil())
            }

            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(uuid::Uuid::parse_str(s)?))
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(u: uuid::Uuid) -> Self {
                Self(u)
            }
        }
    };
}

crate::define_uuid_id! {
    /// Unique identifier for a job.
    pub struct JobId;
}

crate::define_uuid_id! {
    /// Unique identifier for a task. `(job_id, task_id)` is the durable key.
    pub struct TaskId;
}

crate::define_uuid_id! {
    /// Unique identifier for a pool. Pools are also addressable by name.
    pub struct PoolId;
}

crate::define_uuid_id! {
    /// Unique identifier for a scaleset.
    pub struct ScalesetId;
}

crate::define_uuid_id! {
    /// Identifier an agent presents for the VM it runs on.
    pub struct MachineId;
}

crate::define_uuid_id! {
    /// Unique identifier for a per-region proxy VM.
    pub struct ProxyId;
}

crate::define_uuid_id! {
    /// Unique identifier for a dispatched work-set record.
    pub struct WorkSetId;
}

crate::define_uuid_id! {
    /// Opaque handle to a value held in the secret store.
    pub struct SecretId;
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
