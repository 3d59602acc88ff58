//! Roster types: queues, their places, and their clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;
use crate::identity::Identity;

/// Reference from a client's roster entry to its booked slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRef {
    /// Id of the place the appointment is booked at.
    pub place: String,
    /// Absolute timestamp of the slot.
    pub time: DateTime<Utc>,
}

/// A service provider registered in exactly one queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    /// The provider's account identity.
    pub identity: Identity,
    /// The queue this place belongs to.
    pub queue_id: String,
}

/// A requester holding at most one active appointment in a queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// The requester's account identity.
    pub identity: Identity,
    /// The queue this entry belongs to.
    pub queue_id: String,
    /// Set by a successful approve. Mutually exclusive with `cancelled`.
    pub approved: bool,
    /// Set by a successful cancel. Mutually exclusive with `approved`.
    pub cancelled: bool,
    /// True once an employee has approved or cancelled the entry.
    pub processed: bool,
    /// The client's active appointment, if any.
    pub appointment: Option<AppointmentRef>,
}

impl Client {
    /// A fresh, unprocessed entry with the given appointment.
    pub fn new(identity: Identity, queue_id: impl Into<String>, appointment: AppointmentRef) -> Self {
        Self {
            identity,
            queue_id: queue_id.into(),
            approved: false,
            cancelled: false,
            processed: false,
            appointment: Some(appointment),
        }
    }

    /// Mark approved. Re-approving is a conflict, not a no-op.
    pub fn approve(&mut self) -> Result<(), BookingError> {
        if self.approved {
            return Err(BookingError::Conflict("client is already approved".to_string()));
        }
        self.cancelled = false;
        self.approved = true;
        self.processed = true;
        Ok(())
    }

    /// Mark cancelled. Re-cancelling is a conflict, not a no-op.
    pub fn cancel(&mut self) -> Result<(), BookingError> {
        if self.cancelled {
            return Err(BookingError::Conflict("client is already cancelled".to_string()));
        }
        self.approved = false;
        self.cancelled = true;
        self.processed = true;
        Ok(())
    }
}

/// A named collection of places and clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    /// Queue id.
    pub id: String,
    /// Queue name, unique across the system.
    pub name: String,
    /// Registered service providers.
    #[serde(default)]
    pub places: Vec<Place>,
    /// Registered clients.
    #[serde(default)]
    pub clients: Vec<Client>,
}

impl Queue {
    /// Create an empty queue with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            places: Vec::new(),
            clients: Vec::new(),
        }
    }

    /// The place registered under `place_id`, if any.
    pub fn place(&self, place_id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.identity.user_id == place_id)
    }

    /// The client entry for `client_id`, if any.
    pub fn client(&self, client_id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.identity.user_id == client_id)
    }

    /// Mutable client entry for `client_id`.
    pub fn client_mut(&mut self, client_id: &str) -> Option<&mut Client> {
        self.clients
            .iter_mut()
            .find(|c| c.identity.user_id == client_id)
    }

    /// True when `candidate` collides with any place on email, phone or
    /// username.
    pub fn place_identity_taken(&self, candidate: &Identity) -> bool {
        identity_taken(self.places.iter().map(|p| &p.identity), candidate)
    }

    /// True when `candidate` collides with any client on email, phone or
    /// username.
    pub fn client_identity_taken(&self, candidate: &Identity) -> bool {
        identity_taken(self.clients.iter().map(|c| &c.identity), candidate)
    }

    /// Remove the place registered under `place_id`. Returns false when no
    /// such place exists.
    pub fn remove_place(&mut self, place_id: &str) -> bool {
        let before = self.places.len();
        self.places.retain(|p| p.identity.user_id != place_id);
        self.places.len() != before
    }

    /// Remove the client entry for `client_id`, returning it.
    pub fn remove_client(&mut self, client_id: &str) -> Option<Client> {
        let index = self
            .clients
            .iter()
            .position(|c| c.identity.user_id == client_id)?;
        Some(self.clients.remove(index))
    }
}

/// Membership collision rule: any match on email, phone or username counts.
fn identity_taken<'a>(
    mut existing: impl Iterator<Item = &'a Identity>,
    candidate: &Identity,
) -> bool {
    existing.any(|i| {
        i.email == candidate.email
            || i.phone == candidate.phone
            || i.username == candidate.username
    })
}
