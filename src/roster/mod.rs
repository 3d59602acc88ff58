//! Roster aggregate: queues and their place/client membership.
//!
//! A [`Queue`] embeds its [`Place`]s and [`Client`]s the way the persisted
//! roster document does. Membership rules (duplicate detection by email,
//! phone or username; the approve/cancel flag machine) live on the types;
//! [`RosterStore`] is the storage seam with an in-memory implementation.

mod store;
mod types;

pub use store::{MemoryRosterStore, RosterStore};
pub use types::{AppointmentRef, Client, Place, Queue};
