//! The booking coordinator: every roster/schedule mutation goes through here.
//!
//! The coordinator owns the one cross-aggregate invariant of the system: a
//! client's roster `appointment` and the matching schedule-record appointment
//! exist together or not at all. Each operation is a bounded sequence of
//! store reads and writes; the only external call is the best-effort reminder
//! dispatch after a successful booking, which never rolls anything back.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use tracing::{debug, info, warn};

use crate::booking::locks::KeyedLocks;
use crate::config::Config;
use crate::error::{BookingError, Result, WaitlineError};
use crate::identity::{IdentityProvider, MemoryIdentityProvider, Role};
use crate::notify::{LogDispatcher, NotificationDispatcher};
use crate::roster::{AppointmentRef, Client, MemoryRosterStore, Place, Queue, RosterStore};
use crate::schedule::{
    available_slots, weekday_name, Appointment, DaySchedule, MemoryScheduleStore, ScheduleRecord,
    ScheduleStore,
};

/// Outcome of a successful booking.
///
/// The booking itself is terminal once this is returned; the reminder flag
/// only reports whether the best-effort dispatch went through.
#[derive(Debug, Clone)]
pub struct BookingOutcome {
    /// The roster after the booking.
    pub queue: Queue,
    /// False when reminders are disabled or the dispatcher failed.
    pub reminder_scheduled: bool,
}

/// Coordinates bookings, cancellations and membership cascades across the
/// roster and schedule stores.
pub struct BookingCoordinator {
    roster: Arc<dyn RosterStore>,
    schedules: Arc<dyn ScheduleStore>,
    identity: Arc<dyn IdentityProvider>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    config: Config,
    // Lock order is queue before place, everywhere, to stay deadlock-free.
    queue_locks: KeyedLocks,
    place_locks: KeyedLocks,
}

/// Builder for [`BookingCoordinator`]. Unset collaborators default to the
/// in-memory implementations.
#[derive(Default)]
pub struct BookingCoordinatorBuilder {
    roster: Option<Arc<dyn RosterStore>>,
    schedules: Option<Arc<dyn ScheduleStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    dispatcher: Option<Arc<dyn NotificationDispatcher>>,
    config: Option<Config>,
}

impl BookingCoordinatorBuilder {
    pub fn roster(mut self, roster: Arc<dyn RosterStore>) -> Self {
        self.roster = Some(roster);
        self
    }

    pub fn schedules(mut self, schedules: Arc<dyn ScheduleStore>) -> Self {
        self.schedules = Some(schedules);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> BookingCoordinator {
        BookingCoordinator {
            roster: self
                .roster
                .unwrap_or_else(|| Arc::new(MemoryRosterStore::new())),
            schedules: self
                .schedules
                .unwrap_or_else(|| Arc::new(MemoryScheduleStore::new())),
            identity: self
                .identity
                .unwrap_or_else(|| Arc::new(MemoryIdentityProvider::new())),
            dispatcher: self.dispatcher.unwrap_or_else(|| Arc::new(LogDispatcher)),
            config: self.config.unwrap_or_default(),
            queue_locks: KeyedLocks::new(),
            place_locks: KeyedLocks::new(),
        }
    }
}

impl BookingCoordinator {
    pub fn builder() -> BookingCoordinatorBuilder {
        BookingCoordinatorBuilder::default()
    }

    pub fn new(
        roster: Arc<dyn RosterStore>,
        schedules: Arc<dyn ScheduleStore>,
        identity: Arc<dyn IdentityProvider>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        config: Config,
    ) -> Self {
        Self {
            roster,
            schedules,
            identity,
            dispatcher,
            config,
            queue_locks: KeyedLocks::new(),
            place_locks: KeyedLocks::new(),
        }
    }

    // ========================================================================
    // Queues
    // ========================================================================

    /// Create an empty queue. The name must be unused.
    pub async fn create_queue(&self, name: &str) -> Result<Queue> {
        let queue = self.roster.create_queue(name).await?;
        info!("Created queue {:?} ({})", queue.name, queue.id);
        Ok(queue)
    }

    /// Delete a queue, cascading place removal first so no schedule record
    /// or client appointment outlives it.
    ///
    /// The queue lock is held across the whole cascade; a place added
    /// concurrently either lands before the cascade reads the roster (and is
    /// swept up) or blocks until the queue is gone (and fails with
    /// `NotFound`).
    pub async fn delete_queue(&self, queue_id: &str) -> Result<()> {
        let _queue_guard = self.queue_locks.acquire(queue_id).await;
        let mut queue = self.get_queue(queue_id).await?;

        let place_ids: Vec<String> = queue
            .places
            .iter()
            .map(|p| p.identity.user_id.clone())
            .collect();
        for place_id in &place_ids {
            let _place_guard = self.place_locks.acquire(place_id).await;
            Self::strip_place(&mut queue, place_id)?;
            if !self.schedules.delete(place_id).await? {
                debug!("Place {place_id} had no schedule record to delete");
            }
        }

        self.roster.delete(queue_id).await?;
        info!("Deleted queue {:?} ({})", queue.name, queue_id);
        Ok(())
    }

    /// All queues.
    pub async fn list_queues(&self) -> Result<Vec<Queue>> {
        self.roster.list().await
    }

    /// One queue by id.
    pub async fn find_queue(&self, queue_id: &str) -> Result<Option<Queue>> {
        self.roster.get(queue_id).await
    }

    // ========================================================================
    // Places
    // ========================================================================

    /// Register an employee as a place in a queue.
    ///
    /// Provisions a schedule record with the default weekly schedule when the
    /// identity has none yet; a place never exists without one.
    pub async fn add_place(&self, queue_id: &str, user_id: &str) -> Result<Queue> {
        let _queue_guard = self.queue_locks.acquire(queue_id).await;
        let mut queue = self.get_queue(queue_id).await?;

        let identity = self
            .identity
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("user {user_id} not found")))?;
        if identity.role != Role::Employee {
            return Err(BookingError::Forbidden(format!(
                "user {} is not an employee",
                identity.username
            ))
            .into());
        }
        if queue.place_identity_taken(&identity) {
            return Err(BookingError::Conflict(
                "this user already exists in this queue".to_string(),
            )
            .into());
        }

        // Schedule record first: a visible place must always have one.
        if self.schedules.get(user_id).await?.is_none() {
            let record =
                ScheduleRecord::new(user_id, self.config.booking.default_schedule.clone());
            self.schedules.create(record).await?;
        }

        queue.places.push(Place {
            identity,
            queue_id: queue.id.clone(),
        });
        let queue = self.roster.update(queue).await?;
        info!("Added place {user_id} to queue {queue_id}");
        Ok(queue)
    }

    /// Remove a place and cascade: clients pointing at it lose their
    /// appointment (but stay in the queue), and its schedule record is
    /// deleted.
    pub async fn remove_place(&self, queue_id: &str, place_id: &str) -> Result<Queue> {
        let _queue_guard = self.queue_locks.acquire(queue_id).await;
        let _place_guard = self.place_locks.acquire(place_id).await;

        let mut queue = self.get_queue(queue_id).await?;
        let stripped = Self::strip_place(&mut queue, place_id)?;
        let queue = self.roster.update(queue).await?;
        if !self.schedules.delete(place_id).await? {
            debug!("Place {place_id} had no schedule record to delete");
        }
        info!("Removed place {place_id} from queue {queue_id} ({stripped} appointments stripped)");
        Ok(queue)
    }

    // ========================================================================
    // Booking
    // ========================================================================

    /// Book `time` at a place for a client, joining the client to the queue.
    ///
    /// All preconditions run under the queue and place locks, before either
    /// aggregate is written, so a failed booking leaves no trace. After both
    /// writes succeed, a reminder is requested best-effort.
    pub async fn book_appointment(
        &self,
        queue_id: &str,
        client_username: &str,
        place_id: &str,
        time: DateTime<Utc>,
    ) -> Result<BookingOutcome> {
        let _queue_guard = self.queue_locks.acquire(queue_id).await;
        let _place_guard = self.place_locks.acquire(place_id).await;

        let mut queue = self.get_queue(queue_id).await?;
        if queue.place(place_id).is_none() {
            return Err(BookingError::NotFound(format!(
                "place {place_id} not found in queue {queue_id}"
            ))
            .into());
        }

        let client = self
            .identity
            .find_by_username(client_username)
            .await?
            .ok_or_else(|| {
                BookingError::NotFound(format!("user {client_username} not found"))
            })?;
        if client.user_id == place_id {
            return Err(
                BookingError::Forbidden("a place cannot book itself".to_string()).into(),
            );
        }
        if queue.client_identity_taken(&client) {
            return Err(BookingError::Conflict(
                "this user already exists in this queue".to_string(),
            )
            .into());
        }

        let mut record = self.get_record(place_id).await?;
        let weekday = time.date_naive().weekday();
        let day = record.day_schedule(weekday).ok_or_else(|| {
            BookingError::InvalidSlot(format!("no schedule for {}", weekday_name(weekday)))
        })?;
        if !day.contains_slot(time.time()) {
            return Err(BookingError::InvalidSlot(format!(
                "{} is not a slot on {}",
                time.format("%H:%M"),
                weekday_name(weekday)
            ))
            .into());
        }
        if record.has_appointment_at(time) {
            return Err(
                BookingError::Conflict("appointment already exists".to_string()).into(),
            );
        }

        record.appointments.push(Appointment {
            time,
            client_id: client.user_id.clone(),
        });
        self.schedules.update(record).await?;

        let client_id = client.user_id.clone();
        let email = client.email.clone();
        queue.clients.push(Client::new(
            client,
            queue_id,
            AppointmentRef {
                place: place_id.to_string(),
                time,
            },
        ));
        let queue = match self.roster.update(queue).await {
            Ok(queue) => queue,
            // The appointment is committed but the roster entry is not:
            // surface the divergence instead of a generic error.
            Err(err) => {
                return Err(BookingError::PartialFailure {
                    place_id: place_id.to_string(),
                    client_id,
                    detail: format!("roster write failed after schedule write: {err}"),
                }
                .into())
            }
        };

        info!("Booked {time} at place {place_id} for client {client_id}");
        let reminder_scheduled = self.request_reminder(&email, time).await;
        Ok(BookingOutcome {
            queue,
            reminder_scheduled,
        })
    }

    /// Cancel a client's appointment, removing the roster entry and the
    /// schedule-side appointment together.
    pub async fn cancel_appointment(&self, queue_id: &str, client_id: &str) -> Result<Queue> {
        let _queue_guard = self.queue_locks.acquire(queue_id).await;
        let mut queue = self.get_queue(queue_id).await?;
        let entry = queue.client(client_id).ok_or_else(|| {
            BookingError::NotFound(format!("client {client_id} not found in queue {queue_id}"))
        })?;
        let appointment = entry.appointment.clone().ok_or_else(|| {
            BookingError::Conflict("client has no appointment to remove".to_string())
        })?;

        let _place_guard = self.place_locks.acquire(&appointment.place).await;

        // Roster first (the order spec'd for cancellation); a failure on the
        // schedule side from here on is a partial failure, not a rollback.
        queue.remove_client(client_id);
        let queue = self.roster.update(queue).await?;

        let mut record = match self.schedules.get(&appointment.place).await? {
            Some(record) => record,
            None => {
                return Err(BookingError::PartialFailure {
                    place_id: appointment.place.clone(),
                    client_id: client_id.to_string(),
                    detail: "schedule record missing for cancelled appointment".to_string(),
                }
                .into())
            }
        };
        record.appointments.retain(|a| a.client_id != client_id);
        if let Err(err) = self.schedules.update(record).await {
            return Err(BookingError::PartialFailure {
                place_id: appointment.place.clone(),
                client_id: client_id.to_string(),
                detail: format!("schedule write failed after roster removal: {err}"),
            }
            .into());
        }

        info!(
            "Cancelled appointment of client {client_id} at place {} ({})",
            appointment.place, appointment.time
        );
        Ok(queue)
    }

    /// All appointments a client currently holds, across every place.
    pub async fn appointments_for_client(&self, client_id: &str) -> Result<Vec<Appointment>> {
        self.schedules.appointments_for_client(client_id).await
    }

    // ========================================================================
    // Client processing
    // ========================================================================

    /// Approve a client. Clears `cancelled`, sets `processed`.
    pub async fn approve_client(&self, client_id: &str) -> Result<Client> {
        self.process_client(client_id, |c| c.approve()).await
    }

    /// Cancel a client. Clears `approved`, sets `processed`.
    pub async fn cancel_client(&self, client_id: &str) -> Result<Client> {
        self.process_client(client_id, |c| c.cancel()).await
    }

    async fn process_client(
        &self,
        client_id: &str,
        transition: impl FnOnce(&mut Client) -> std::result::Result<(), BookingError>,
    ) -> Result<Client> {
        let located = self
            .roster
            .find_queue_with_client(client_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("client {client_id} not found")))?;

        // Re-fetch under the queue lock so the flag flip is not lost to a
        // concurrent roster write.
        let _queue_guard = self.queue_locks.acquire(&located.id).await;
        let mut queue = self.get_queue(&located.id).await?;
        let client = queue
            .client_mut(client_id)
            .ok_or_else(|| BookingError::NotFound(format!("client {client_id} not found")))?;
        transition(client)?;
        let updated = client.clone();

        self.roster.update(queue).await?;
        debug!(
            "Processed client {client_id}: approved={}, cancelled={}",
            updated.approved, updated.cancelled
        );
        Ok(updated)
    }

    // ========================================================================
    // Schedules
    // ========================================================================

    /// Free slots at a place on a calendar date, in schedule order.
    ///
    /// Calendar-date based: slots earlier than the current clock time are
    /// still returned when `date` is today. Filtering those out is a display
    /// concern owned by the caller.
    pub async fn available_slots(
        &self,
        place_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>> {
        let record = self.get_record(place_id).await?;
        available_slots(&record, date)
    }

    /// A place's weekly schedule.
    pub async fn get_schedule(&self, place_id: &str) -> Result<Vec<DaySchedule>> {
        Ok(self.get_record(place_id).await?.schedule)
    }

    /// Replace a place's weekly schedule. Only the place's own (employee)
    /// identity may do this.
    ///
    /// Under the default `Reject` policy, a replacement that would strand
    /// already-booked appointments fails with a conflict;
    /// `AllowOrphans` accepts it and leaves those appointments in place.
    pub async fn submit_schedule(
        &self,
        place_id: &str,
        requester_id: &str,
        schedule: Vec<DaySchedule>,
    ) -> Result<Vec<DaySchedule>> {
        if requester_id != place_id {
            return Err(BookingError::Forbidden(
                "only the place's own identity may replace its schedule".to_string(),
            )
            .into());
        }
        let requester = self
            .identity
            .find_by_id(requester_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("user {requester_id} not found")))?;
        if requester.role != Role::Employee {
            return Err(BookingError::Forbidden(format!(
                "user {} is not an employee",
                requester.username
            ))
            .into());
        }

        let mut seen = std::collections::HashSet::new();
        for day in &schedule {
            if !seen.insert(day.day) {
                return Err(BookingError::Conflict(format!(
                    "schedule lists {} more than once",
                    weekday_name(day.day)
                ))
                .into());
            }
        }

        let _guard = self.place_locks.acquire(place_id).await;
        let mut record = self.get_record(place_id).await?;

        if self.config.booking.schedule_policy == crate::config::SchedulePolicy::Reject {
            let replacement = ScheduleRecord::new(place_id, schedule.clone());
            let stranded = record
                .appointments
                .iter()
                .filter(|a| !replacement.slot_matches(a.time))
                .count();
            if stranded > 0 {
                return Err(BookingError::Conflict(format!(
                    "replacement would strand {stranded} booked appointment(s)"
                ))
                .into());
            }
        }

        record.schedule = schedule;
        let record = self.schedules.update(record).await?;
        info!("Replaced weekly schedule for place {place_id}");
        Ok(record.schedule)
    }

    /// Remove one slot from one weekday of a place's schedule. Gated like
    /// [`submit_schedule`].
    pub async fn remove_slot(
        &self,
        place_id: &str,
        requester_id: &str,
        day: Weekday,
        time: NaiveTime,
    ) -> Result<Vec<DaySchedule>> {
        if requester_id != place_id {
            return Err(BookingError::Forbidden(
                "only the place's own identity may edit its schedule".to_string(),
            )
            .into());
        }
        let requester = self
            .identity
            .find_by_id(requester_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("user {requester_id} not found")))?;
        if requester.role != Role::Employee {
            return Err(BookingError::Forbidden(format!(
                "user {} is not an employee",
                requester.username
            ))
            .into());
        }

        let _guard = self.place_locks.acquire(place_id).await;
        let mut record = self.get_record(place_id).await?;

        let day_schedule = record.day_schedule_mut(day).ok_or_else(|| {
            BookingError::NotFound(format!("no schedule for {}", weekday_name(day)))
        })?;
        let index = day_schedule
            .time_stamps
            .iter()
            .position(|t| *t == time)
            .ok_or_else(|| {
                BookingError::InvalidSlot(format!(
                    "{} is not a slot on {}",
                    time.format("%H:%M"),
                    weekday_name(day)
                ))
            })?;
        day_schedule.time_stamps.remove(index);

        let record = self.schedules.update(record).await?;
        debug!(
            "Removed slot {} on {} for place {place_id}",
            time.format("%H:%M"),
            weekday_name(day)
        );
        Ok(record.schedule)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Drop a place from an already-fetched roster and clear every client
    /// appointment pointing at it. Callers hold the queue and place locks
    /// and own persisting (or deleting) the roster afterwards.
    fn strip_place(queue: &mut Queue, place_id: &str) -> Result<usize> {
        if !queue.remove_place(place_id) {
            return Err(BookingError::NotFound(format!(
                "place {place_id} not found in queue {}",
                queue.id
            ))
            .into());
        }

        let mut stripped = 0;
        for client in queue.clients.iter_mut() {
            if client
                .appointment
                .as_ref()
                .is_some_and(|a| a.place == place_id)
            {
                client.appointment = None;
                stripped += 1;
            }
        }
        Ok(stripped)
    }

    async fn get_queue(&self, queue_id: &str) -> Result<Queue> {
        self.roster
            .get(queue_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("queue {queue_id} not found")).into())
    }

    async fn get_record(&self, place_id: &str) -> Result<ScheduleRecord> {
        self.schedules.get(place_id).await?.ok_or_else(|| {
            WaitlineError::from(BookingError::NotFound(format!(
                "schedule record for place {place_id} not found"
            )))
        })
    }

    /// Best-effort reminder dispatch. Never fails the booking.
    async fn request_reminder(&self, email: &str, time: DateTime<Utc>) -> bool {
        if !self.config.notify.reminders_enabled {
            return false;
        }
        match self.dispatcher.schedule_reminder(email, time).await {
            Ok(()) => true,
            Err(err) => {
                warn!("Reminder dispatch failed for {email} at {time}: {err}");
                false
            }
        }
    }
}
