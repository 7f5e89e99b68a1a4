//! Announcement stores: the read trait and its backends.

pub mod airtable;
pub mod memory;

use crate::error::Result;
use crate::model::announcement::Announcement;

/// Read access to a collection of announcement records.
///
/// The search pipeline only reads; posting and editing live upstream in
/// the school portal.
pub trait AnnouncementStore {
    /// Every record in the store, in store order.
    fn fetch_all(&self) -> Result<Vec<Announcement>>;

    /// One record by its store id, `None` when absent.
    fn fetch_by_id(&self, id: &str) -> Result<Option<Announcement>>;

    /// The most recently sent record, judged by `SentTime`.
    fn latest(&self) -> Result<Option<Announcement>>;
}

impl<S: AnnouncementStore + ?Sized> AnnouncementStore for Box<S> {
    fn fetch_all(&self) -> Result<Vec<Announcement>> {
        (**self).fetch_all()
    }

    fn fetch_by_id(&self, id: &str) -> Result<Option<Announcement>> {
        (**self).fetch_by_id(id)
    }

    fn latest(&self) -> Result<Option<Announcement>> {
        (**self).latest()
    }
}
