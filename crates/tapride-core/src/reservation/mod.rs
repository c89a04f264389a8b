//! Reservation draft state machine, history records and the store that
//! owns them together with the rider's persisted places and preferences.

mod model;
mod store;

pub use model::{DraftPhase, HISTORY_CAPACITY, ReservationDraft, ReservationRecord};
pub use store::ReservationStore;
