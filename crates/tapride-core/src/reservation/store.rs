//! Reservation store: the draft state machine plus persisted rider data.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::model::{DraftPhase, HISTORY_CAPACITY, ReservationDraft, ReservationRecord};
use crate::payment::PaymentMethod;
use crate::place::{FAVORITES_CAPACITY, NamedPlace, Point, push_newest_first};
use crate::storage::{KeyValueStore, keys, load_or_default, save_json};

/// Owns the reservation draft and every persisted rider setting.
///
/// All mutations run synchronously and write their own storage key before
/// returning. Operations that are not valid in the current state are
/// no-ops and report that through their return value.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tapride_core::place::Point;
/// use tapride_core::reservation::{DraftPhase, ReservationStore};
/// use tapride_core::storage::MemoryKeyValueStore;
///
/// let mut store = ReservationStore::load(Arc::new(MemoryKeyValueStore::new()));
/// store.set_candidate(Point::new(39.70, 141.15));
/// assert!(store.choose_candidate_as_pickup());
/// assert_eq!(store.phase(), DraftPhase::AwaitingDropoff);
/// ```
pub struct ReservationStore {
    storage: Arc<dyn KeyValueStore>,
    draft: ReservationDraft,
    home: Option<NamedPlace>,
    favorites: Vec<NamedPlace>,
    payment: PaymentMethod,
    outing_mode: bool,
    asked_outing_mode: bool,
    outing_prompt_open: bool,
}

impl ReservationStore {
    /// Restores persisted state from `storage`.
    ///
    /// Each key is loaded on its own and falls back to its default when
    /// missing or corrupt. On first run (the outing prompt has never been
    /// answered) the prompt is opened.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let home: Option<NamedPlace> = load_or_default(storage.as_ref(), keys::HOME, None);
        let mut favorites: Vec<NamedPlace> =
            load_or_default(storage.as_ref(), keys::FAVORITES, Vec::new());
        favorites.truncate(FAVORITES_CAPACITY);
        let payment = load_or_default(storage.as_ref(), keys::PAYMENT, PaymentMethod::default());
        let outing_mode = load_or_default(storage.as_ref(), keys::OUTING_MODE, false);
        let asked_outing_mode = load_or_default(storage.as_ref(), keys::ASKED_OUTING_MODAL, false);

        tracing::info!(
            home = home.is_some(),
            favorites = favorites.len(),
            %payment,
            outing_mode,
            asked_outing_mode,
            "Reservation store loaded"
        );

        Self {
            storage,
            draft: ReservationDraft::new(),
            home,
            favorites,
            payment,
            outing_mode,
            asked_outing_mode,
            outing_prompt_open: !asked_outing_mode,
        }
    }

    // ============================================================================
    // Draft state machine
    // ============================================================================

    pub fn draft(&self) -> &ReservationDraft {
        &self.draft
    }

    pub fn phase(&self) -> DraftPhase {
        self.draft.phase()
    }

    pub fn candidate(&self) -> Option<Point> {
        self.draft.candidate()
    }

    /// Stages the most recently picked map point.
    pub fn set_candidate(&mut self, point: Point) {
        tracing::debug!(%point, "Candidate point set");
        self.draft.set_candidate(point);
    }

    pub fn choose_candidate_as_pickup(&mut self) -> bool {
        let applied = self.draft.choose_candidate_as_pickup();
        if applied {
            tracing::debug!(pickup = ?self.draft.pickup(), "Pickup chosen");
        }
        applied
    }

    pub fn choose_candidate_as_dropoff(&mut self) -> bool {
        let applied = self.draft.choose_candidate_as_dropoff();
        if applied {
            tracing::debug!(dropoff = ?self.draft.dropoff(), "Drop-off chosen");
        }
        applied
    }

    /// Clears pickup, drop-off and candidate.
    pub fn reset(&mut self) {
        self.draft.reset();
    }

    /// Confirms the draft now. See [`ReservationStore::confirm_at`].
    pub fn confirm(&mut self) -> Option<ReservationRecord> {
        self.confirm_at(Utc::now())
    }

    /// Records the draft in history with timestamp `at` and resets it.
    ///
    /// Returns the recorded entry, or `None` (and changes nothing) unless
    /// both pickup and drop-off are set.
    pub fn confirm_at(&mut self, at: DateTime<Utc>) -> Option<ReservationRecord> {
        let (pickup, dropoff) = self.draft.endpoints()?;
        let record = ReservationRecord::new(at, pickup, dropoff, self.payment);

        let mut history = self.history();
        push_newest_first(&mut history, record.clone(), HISTORY_CAPACITY);
        self.persist(keys::HISTORY, &history);

        tracing::info!(
            %pickup,
            %dropoff,
            payment = %record.payment,
            "Reservation confirmed"
        );

        self.reset();
        Some(record)
    }

    /// Confirmed reservations as currently stored, newest first.
    pub fn history(&self) -> Vec<ReservationRecord> {
        let mut history: Vec<ReservationRecord> =
            load_or_default(self.storage.as_ref(), keys::HISTORY, Vec::new());
        history.truncate(HISTORY_CAPACITY);
        history
    }

    // ============================================================================
    // Places
    // ============================================================================

    pub fn home(&self) -> Option<&NamedPlace> {
        self.home.as_ref()
    }

    /// Replaces the home with the candidate point. No-op without a candidate.
    pub fn register_home_from_candidate(&mut self, name: impl Into<String>) -> bool {
        let Some(point) = self.draft.candidate() else {
            return false;
        };
        let home = NamedPlace::new(name, point);
        tracing::info!(name = %home.name, %point, "Home registered");
        self.persist(keys::HOME, &home);
        self.home = Some(home);
        true
    }

    pub fn clear_home(&mut self) {
        self.home = None;
        if let Err(e) = self.storage.delete(keys::HOME) {
            tracing::warn!(key = keys::HOME, error = %e, "Failed to clear stored value");
        }
    }

    /// Favorites, newest first.
    pub fn favorites(&self) -> &[NamedPlace] {
        &self.favorites
    }

    /// Default label for the next favorite, e.g. `"Favorite 3"`.
    pub fn next_favorite_name(&self) -> String {
        format!("Favorite {}", self.favorites.len() + 1)
    }

    /// Prepends the candidate point as a favorite, keeping the newest five.
    /// No-op without a candidate.
    pub fn add_favorite_from_candidate(&mut self, name: impl Into<String>) -> bool {
        let Some(point) = self.draft.candidate() else {
            return false;
        };
        let favorite = NamedPlace::new(name, point);
        tracing::info!(name = %favorite.name, %point, "Favorite added");
        push_newest_first(&mut self.favorites, favorite, FAVORITES_CAPACITY);
        self.persist(keys::FAVORITES, &self.favorites);
        true
    }

    pub fn clear_all_favorites(&mut self) {
        self.favorites.clear();
        self.persist(keys::FAVORITES, &self.favorites);
    }

    // ============================================================================
    // Preferences
    // ============================================================================

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment = method;
        self.persist(keys::PAYMENT, &method);
    }

    /// Flips between cash and cashless and returns the new method.
    pub fn toggle_payment_method(&mut self) -> PaymentMethod {
        let next = self.payment.toggled();
        self.set_payment_method(next);
        next
    }

    pub fn outing_mode(&self) -> bool {
        self.outing_mode
    }

    /// Whether the outing-mode prompt has ever been answered or dismissed.
    pub fn has_asked_outing_mode(&self) -> bool {
        self.asked_outing_mode
    }

    pub fn is_outing_prompt_open(&self) -> bool {
        self.outing_prompt_open
    }

    /// Reopens the outing-mode prompt by hand. The asked flag is untouched.
    pub fn open_outing_prompt(&mut self) {
        self.outing_prompt_open = true;
    }

    /// Answers the outing-mode prompt: stores the choice and closes it.
    pub fn set_outing_mode(&mut self, enabled: bool) {
        self.outing_mode = enabled;
        self.persist(keys::OUTING_MODE, &enabled);
        tracing::info!(enabled, "Outing mode set");
        self.close_outing_prompt();
    }

    /// Closes the prompt without changing the outing-mode flag.
    pub fn dismiss_outing_prompt(&mut self) {
        self.close_outing_prompt();
    }

    fn close_outing_prompt(&mut self) {
        self.outing_prompt_open = false;
        self.asked_outing_mode = true;
        self.persist(keys::ASKED_OUTING_MODAL, &true);
    }

    /// Writes `value` under `key`. In-memory state is kept if the write fails.
    fn persist<T>(&self, key: &str, value: &T)
    where
        T: Serialize + ?Sized,
    {
        if let Err(e) = save_json(self.storage.as_ref(), key, value) {
            tracing::warn!(key, error = %e, "Failed to persist value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;
    use chrono::TimeZone;

    fn point_a() -> Point {
        Point::new(39.7036, 141.1527)
    }

    fn point_b() -> Point {
        Point::new(39.7200, 141.1300)
    }

    fn fresh() -> (Arc<MemoryKeyValueStore>, ReservationStore) {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let store = ReservationStore::load(storage.clone());
        (storage, store)
    }

    fn confirm_trip(store: &mut ReservationStore, pickup: Point, dropoff: Point, minute: u32) {
        store.set_candidate(pickup);
        assert!(store.choose_candidate_as_pickup());
        store.set_candidate(dropoff);
        assert!(store.choose_candidate_as_dropoff());
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 9, minute, 0).unwrap();
        assert!(store.confirm_at(at).is_some());
    }

    #[test]
    fn test_defaults_on_empty_storage() {
        let (_, store) = fresh();
        assert!(store.home().is_none());
        assert!(store.favorites().is_empty());
        assert_eq!(store.payment_method(), PaymentMethod::Cash);
        assert!(!store.outing_mode());
        assert!(!store.has_asked_outing_mode());
        assert_eq!(store.phase(), DraftPhase::AwaitingPickup);
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_full_reservation_scenario() {
        let (_, mut store) = fresh();

        store.set_candidate(point_a());
        assert!(store.choose_candidate_as_pickup());
        assert_eq!(store.phase(), DraftPhase::AwaitingDropoff);

        store.set_candidate(point_b());
        assert!(store.choose_candidate_as_dropoff());
        assert_eq!(store.phase(), DraftPhase::ReadyToConfirm);

        let record = store.confirm().expect("ready draft should confirm");
        assert_eq!(record.pickup, point_a());
        assert_eq!(record.dropoff, point_b());
        assert_eq!(record.payment, PaymentMethod::Cash);

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], record);

        assert_eq!(store.phase(), DraftPhase::AwaitingPickup);
        assert!(store.draft().pickup().is_none());
        assert!(store.draft().dropoff().is_none());
        assert!(store.candidate().is_none());
    }

    #[test]
    fn test_confirm_without_both_points_is_noop() {
        let (storage, mut store) = fresh();
        assert!(store.confirm().is_none());

        store.set_candidate(point_a());
        store.choose_candidate_as_pickup();
        assert!(store.confirm().is_none());
        assert_eq!(store.phase(), DraftPhase::AwaitingDropoff);
        assert!(storage.get(keys::HISTORY).unwrap().is_none());
    }

    #[test]
    fn test_dropoff_noop_without_candidate_or_pickup() {
        let (_, mut store) = fresh();
        assert!(!store.choose_candidate_as_dropoff());

        store.set_candidate(point_a());
        assert!(!store.choose_candidate_as_dropoff());
        assert_eq!(store.phase(), DraftPhase::AwaitingPickup);
    }

    #[test]
    fn test_history_keeps_newest_five() {
        let (_, mut store) = fresh();
        for minute in 0..6 {
            let pickup = Point::new(f64::from(minute), 0.0);
            confirm_trip(&mut store, pickup, point_b(), minute);
        }

        let history = store.history();
        assert_eq!(history.len(), 5);
        // Newest first: trips 5,4,3,2,1; trip 0 evicted
        let pickups: Vec<f64> = history.iter().map(|r| r.pickup.lat).collect();
        assert_eq!(pickups, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_history_records_current_payment() {
        let (_, mut store) = fresh();
        store.set_payment_method(PaymentMethod::Cashless);
        confirm_trip(&mut store, point_a(), point_b(), 1);
        assert_eq!(store.history()[0].payment, PaymentMethod::Cashless);
    }

    #[test]
    fn test_register_home_requires_candidate() {
        let (storage, mut store) = fresh();
        assert!(!store.register_home_from_candidate("Home"));
        assert!(store.home().is_none());
        assert!(storage.get(keys::HOME).unwrap().is_none());
    }

    #[test]
    fn test_register_home_replaces_previous() {
        let (storage, mut store) = fresh();
        store.set_candidate(point_a());
        assert!(store.register_home_from_candidate("Home"));
        store.set_candidate(point_b());
        assert!(store.register_home_from_candidate("New home"));

        assert_eq!(store.home(), Some(&NamedPlace::new("New home", point_b())));

        let reloaded = ReservationStore::load(storage);
        assert_eq!(reloaded.home(), Some(&NamedPlace::new("New home", point_b())));
    }

    #[test]
    fn test_clear_home_survives_reload() {
        let (storage, mut store) = fresh();
        store.set_candidate(point_a());
        store.register_home_from_candidate("Home");
        store.clear_home();
        assert!(store.home().is_none());

        let reloaded = ReservationStore::load(storage);
        assert!(reloaded.home().is_none());
    }

    #[test]
    fn test_favorites_evict_oldest() {
        let (storage, mut store) = fresh();
        for i in (1..=5).rev() {
            store.set_candidate(Point::new(f64::from(i), 0.0));
            assert!(store.add_favorite_from_candidate(format!("F{}", i)));
        }
        let names: Vec<&str> = store.favorites().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["F1", "F2", "F3", "F4", "F5"]);

        store.set_candidate(Point::new(6.0, 0.0));
        assert!(store.add_favorite_from_candidate("F6"));
        let names: Vec<&str> = store.favorites().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["F6", "F1", "F2", "F3", "F4"]);

        let reloaded = ReservationStore::load(storage);
        assert_eq!(reloaded.favorites(), store.favorites());
    }

    #[test]
    fn test_add_favorite_requires_candidate() {
        let (_, mut store) = fresh();
        assert!(!store.add_favorite_from_candidate("F1"));
        assert!(store.favorites().is_empty());
    }

    #[test]
    fn test_clear_all_favorites() {
        let (storage, mut store) = fresh();
        store.set_candidate(point_a());
        store.add_favorite_from_candidate(store.next_favorite_name());
        assert_eq!(store.favorites()[0].name, "Favorite 1");
        assert_eq!(store.next_favorite_name(), "Favorite 2");

        store.clear_all_favorites();
        assert!(store.favorites().is_empty());
        assert!(ReservationStore::load(storage).favorites().is_empty());
    }

    #[test]
    fn test_place_registration_keeps_draft_intact() {
        let (_, mut store) = fresh();
        store.set_candidate(point_a());
        store.register_home_from_candidate("Home");
        store.add_favorite_from_candidate("F1");
        assert_eq!(store.candidate(), Some(point_a()));
        assert_eq!(store.phase(), DraftPhase::AwaitingPickup);
    }

    #[test]
    fn test_payment_persists_and_toggles() {
        let (storage, mut store) = fresh();
        assert_eq!(store.toggle_payment_method(), PaymentMethod::Cashless);
        assert_eq!(
            storage.get(keys::PAYMENT).unwrap().as_deref(),
            Some("\"Cashless\"")
        );
        assert_eq!(
            ReservationStore::load(storage.clone()).payment_method(),
            PaymentMethod::Cashless
        );

        store.set_payment_method(PaymentMethod::Cash);
        assert_eq!(ReservationStore::load(storage).payment_method(), PaymentMethod::Cash);
    }

    #[test]
    fn test_outing_prompt_opens_on_first_run_only() {
        let (storage, mut store) = fresh();
        assert!(store.is_outing_prompt_open());

        store.dismiss_outing_prompt();
        assert!(!store.is_outing_prompt_open());
        assert!(store.has_asked_outing_mode());
        assert!(!store.outing_mode());

        let reloaded = ReservationStore::load(storage);
        assert!(!reloaded.is_outing_prompt_open());
        assert!(reloaded.has_asked_outing_mode());
    }

    #[test]
    fn test_set_outing_mode_marks_asked() {
        for enabled in [true, false] {
            let (storage, mut store) = fresh();
            store.set_outing_mode(enabled);
            assert!(store.has_asked_outing_mode());
            assert!(!store.is_outing_prompt_open());

            let reloaded = ReservationStore::load(storage);
            assert_eq!(reloaded.outing_mode(), enabled);
            assert!(reloaded.has_asked_outing_mode());
        }
    }

    #[test]
    fn test_reopening_prompt_keeps_asked_flag() {
        let (storage, mut store) = fresh();
        store.set_outing_mode(true);
        store.open_outing_prompt();
        assert!(store.is_outing_prompt_open());
        assert!(store.has_asked_outing_mode());

        // Dismissing the reopened prompt leaves the flag alone
        store.dismiss_outing_prompt();
        assert!(store.outing_mode());
        assert!(!ReservationStore::load(storage).is_outing_prompt_open());
    }

    #[test]
    fn test_corrupt_payment_defaults_without_affecting_other_keys() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        storage.set(keys::PAYMENT, "{{ not json").unwrap();
        storage.set(keys::OUTING_MODE, "true").unwrap();
        storage.set(keys::ASKED_OUTING_MODAL, "true").unwrap();
        storage
            .set(
                keys::HOME,
                r#"{"name":"Home","point":{"lat":39.7,"lng":141.1}}"#,
            )
            .unwrap();

        let store = ReservationStore::load(storage);
        assert_eq!(store.payment_method(), PaymentMethod::Cash);
        assert!(store.outing_mode());
        assert!(!store.is_outing_prompt_open());
        assert_eq!(store.home().map(|h| h.name.as_str()), Some("Home"));
    }

    #[test]
    fn test_oversized_stored_favorites_are_truncated() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let favorites: Vec<NamedPlace> = (0..7)
            .map(|i| NamedPlace::new(format!("F{}", i), Point::new(f64::from(i), 0.0)))
            .collect();
        save_json(storage.as_ref(), keys::FAVORITES, &favorites).unwrap();

        let store = ReservationStore::load(storage);
        assert_eq!(store.favorites().len(), FAVORITES_CAPACITY);
        assert_eq!(store.favorites()[0].name, "F0");
    }

    #[test]
    fn test_oversized_stored_history_is_truncated() {
        let storage = Arc::new(MemoryKeyValueStore::new());
        let history: Vec<ReservationRecord> = (0..7)
            .map(|i| {
                let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, i, 0).unwrap();
                let pickup = Point::new(f64::from(i), 0.0);
                ReservationRecord::new(at, pickup, point_b(), PaymentMethod::Cash)
            })
            .collect();
        save_json(storage.as_ref(), keys::HISTORY, &history).unwrap();

        let mut store = ReservationStore::load(storage);
        let loaded = store.history();
        assert_eq!(loaded.len(), HISTORY_CAPACITY);
        assert_eq!(loaded[0].pickup, Point::new(0.0, 0.0));

        confirm_trip(&mut store, point_a(), point_b(), 30);
        let after = store.history();
        assert_eq!(after.len(), HISTORY_CAPACITY);
        assert_eq!(after[0].pickup, point_a());
        assert_eq!(after[1].pickup, Point::new(0.0, 0.0));
        assert_eq!(after[4].pickup, Point::new(3.0, 0.0));
    }
}
