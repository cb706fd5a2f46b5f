//! Identifier newtypes shared across the crate.
//!
//! Every entity gets its own opaque id type so a booking id can never be
//! passed where a slot id is expected. All ids are v4 UUIDs.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

uuid_id!(
    /// Identifier for a bookable slot.
    SlotId
);
uuid_id!(
    /// Identifier for a booking.
    BookingId
);
uuid_id!(
    /// Identifier for a customer (externally authenticated actor).
    CustomerId
);
uuid_id!(
    /// Identifier for an instructor.
    InstructorId
);
uuid_id!(
    /// Identifier for an activity (class/workshop/session type).
    ActivityId
);
