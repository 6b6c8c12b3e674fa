//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each variant's discriminant matches the seed data in the corresponding
//! `*_statuses` table.

use remix_core::job::JobStatus;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by database ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Remix job lifecycle status (`job_statuses`).
    RemixJobStatus {
        Queued = 1,
        Running = 2,
        Finished = 3,
        Failed = 4,
    }
}

impl From<JobStatus> for RemixJobStatus {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Queued => Self::Queued,
            JobStatus::Running => Self::Running,
            JobStatus::Finished => Self::Finished,
            JobStatus::Failed => Self::Failed,
        }
    }
}

impl From<RemixJobStatus> for JobStatus {
    fn from(status: RemixJobStatus) -> Self {
        match status {
            RemixJobStatus::Queued => Self::Queued,
            RemixJobStatus::Running => Self::Running,
            RemixJobStatus::Finished => Self::Finished,
            RemixJobStatus::Failed => Self::Failed,
        }
    }
}
