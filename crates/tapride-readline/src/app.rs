//! Wires the reservation store, the map surface and the terminal renderer
//! together and turns commands into output lines.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

use tapride_core::config::AppConfig;
use tapride_core::error::Result;
use tapride_core::map::{MapSurface, PickPointCallback};
use tapride_core::place::{DEFAULT_HOME_NAME, NamedPlace, Point};
use tapride_core::reservation::{DraftPhase, ReservationStore};
use tapride_core::storage::KeyValueStore;
use tapride_infrastructure::FixedGeolocator;

use crate::commands::{Command, HELP, OutingAction, PromptAnswer};
use crate::terminal_map::TerminalMapRenderer;

pub const OUTING_PROMPT: &str = "Switch to safe outing mode? The screen becomes easier to read \
and family members can follow your trips. [y/n]";

/// One line of output, tagged for colouring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Info(String),
    Success(String),
    Warning(String),
}

impl Output {
    fn info(text: impl Into<String>) -> Self {
        Self::Info(text.into())
    }

    fn success(text: impl Into<String>) -> Self {
        Self::Success(text.into())
    }

    fn warning(text: impl Into<String>) -> Self {
        Self::Warning(text.into())
    }
}

pub struct App {
    store: Arc<Mutex<ReservationStore>>,
    surface: MapSurface,
    renderer: Arc<TerminalMapRenderer>,
}

impl App {
    /// Loads persisted state and initializes the map.
    pub fn new(config: &AppConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let store = Arc::new(Mutex::new(ReservationStore::load(storage)));
        let renderer = Arc::new(TerminalMapRenderer::new());

        let on_pick_point: PickPointCallback = {
            let store = store.clone();
            Arc::new(move |point| {
                store
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .set_candidate(point);
            })
        };

        let mut surface = MapSurface::new(renderer.clone(), config.map.clone(), on_pick_point);
        if let Some(geolocator) = FixedGeolocator::from_config(&config.geolocation) {
            surface = surface.with_geolocator(Arc::new(geolocator), config.geolocation.timeout());
        }
        surface.initialize_from_config()?;

        Ok(Self {
            store,
            surface,
            renderer,
        })
    }

    /// Starts the best-effort recenter on the device location.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        self.surface.try_recenter_on_current_location()
    }

    fn store(&self) -> MutexGuard<'_, ReservationStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_outing_prompt_open(&self) -> bool {
        self.store().is_outing_prompt_open()
    }

    /// Hint describing what the next tap will be used for.
    pub fn tap_hint(&self) -> &'static str {
        match self.store().phase() {
            DraftPhase::AwaitingPickup => "pickup",
            DraftPhase::AwaitingDropoff | DraftPhase::ReadyToConfirm => "drop-off",
        }
    }

    pub fn answer_outing_prompt(&self, input: &str) -> Output {
        let mut store = self.store();
        match PromptAnswer::parse(input) {
            PromptAnswer::Yes => {
                store.set_outing_mode(true);
                Output::success("Outing mode ON")
            }
            PromptAnswer::No => {
                store.set_outing_mode(false);
                Output::success("Outing mode OFF")
            }
            PromptAnswer::Dismiss => {
                store.dismiss_outing_prompt();
                Output::info("Prompt closed")
            }
        }
    }

    pub fn execute(&self, command: Command) -> Vec<Output> {
        match command {
            Command::Tap(point) => {
                // The tap handler locks the store itself.
                if self.renderer.simulate_tap(point) {
                    vec![Output::info(format!("Picked {}", point))]
                } else {
                    vec![Output::warning("Map is not ready")]
                }
            }
            Command::Pickup => {
                let mut store = self.store();
                if store.choose_candidate_as_pickup() {
                    vec![Output::success(format!(
                        "Pickup set to {}. Now pick a drop-off.",
                        fmt_point(store.draft().pickup())
                    ))]
                } else {
                    vec![Output::warning(
                        "Pick a point first (pickup can only be set once per draft)",
                    )]
                }
            }
            Command::Dropoff => {
                let mut store = self.store();
                if store.choose_candidate_as_dropoff() {
                    vec![Output::success(format!(
                        "Drop-off set to {}. Ready to /confirm.",
                        fmt_point(store.draft().dropoff())
                    ))]
                } else {
                    vec![Output::warning(
                        "Set a pickup and pick a new point before choosing the drop-off",
                    )]
                }
            }
            Command::Confirm => match self.store().confirm() {
                Some(record) => vec![Output::success(format!(
                    "Reservation accepted (demo): {} -> {} ({})",
                    record.pickup, record.dropoff, record.payment
                ))],
                None => vec![Output::warning("Choose both pickup and drop-off first")],
            },
            Command::Reset => {
                self.store().reset();
                vec![Output::info("Draft cleared")]
            }
            Command::Home(name) => {
                let name = name.unwrap_or_else(|| DEFAULT_HOME_NAME.to_string());
                let mut store = self.store();
                if store.register_home_from_candidate(name) {
                    vec![Output::success(format!("Home: {}", fmt_place(store.home())))]
                } else {
                    vec![Output::warning("Pick a point on the map first")]
                }
            }
            Command::HomeClear => {
                self.store().clear_home();
                vec![Output::info("Home cleared")]
            }
            Command::Favorite(name) => {
                let mut store = self.store();
                let name = name.unwrap_or_else(|| store.next_favorite_name());
                if store.add_favorite_from_candidate(name) {
                    vec![Output::success(format!(
                        "Favorites: {}",
                        store.favorites().len()
                    ))]
                } else {
                    vec![Output::warning("Pick a point on the map first")]
                }
            }
            Command::FavoritesClear => {
                self.store().clear_all_favorites();
                vec![Output::info("Favorites cleared")]
            }
            Command::Pay(method) => {
                let mut store = self.store();
                let method = match method {
                    Some(method) => {
                        store.set_payment_method(method);
                        method
                    }
                    None => store.toggle_payment_method(),
                };
                vec![Output::success(format!("Payment: {}", method))]
            }
            Command::Outing(action) => {
                let mut store = self.store();
                match action {
                    OutingAction::Open => store.open_outing_prompt(),
                    OutingAction::On => store.set_outing_mode(true),
                    OutingAction::Off => store.set_outing_mode(false),
                    OutingAction::Dismiss => store.dismiss_outing_prompt(),
                }
                vec![Output::info(format!(
                    "Outing mode {}",
                    if store.outing_mode() { "ON" } else { "OFF" }
                ))]
            }
            Command::Status => self.status(),
            Command::History => {
                let history = self.store().history();
                if history.is_empty() {
                    return vec![Output::info("No reservations yet")];
                }
                history
                    .iter()
                    .map(|record| {
                        Output::info(format!(
                            "{}  {} -> {}  {}",
                            record.timestamp, record.pickup, record.dropoff, record.payment
                        ))
                    })
                    .collect()
            }
            Command::Help => HELP.lines().map(Output::info).collect(),
            Command::Quit => Vec::new(),
        }
    }

    fn status(&self) -> Vec<Output> {
        let view = self.renderer.snapshot();
        let store = self.store();
        let draft = store.draft();

        let mut lines = vec![
            Output::info(format!(
                "Map: center {} zoom {}",
                fmt_point(view.center),
                view.zoom
            )),
            Output::info(format!("Selected: {}", fmt_point(draft.candidate()))),
            Output::info(format!("Pickup: {}", fmt_point(draft.pickup()))),
            Output::info(format!("Drop-off: {}", fmt_point(draft.dropoff()))),
            Output::info(format!("Home: {}", fmt_place(store.home()))),
            Output::info(format!("Payment: {}", store.payment_method())),
            Output::info(format!(
                "Outing mode: {}",
                if store.outing_mode() { "ON" } else { "OFF" }
            )),
        ];
        if store.favorites().is_empty() {
            lines.push(Output::info("Favorites: none"));
        } else {
            lines.extend(
                store
                    .favorites()
                    .iter()
                    .map(|f| Output::info(format!("Favorite: {}", f))),
            );
        }
        lines
    }
}

fn fmt_point(point: Option<Point>) -> String {
    point.map_or_else(|| "not set".to_string(), |p| p.to_string())
}

fn fmt_place(place: Option<&NamedPlace>) -> String {
    place.map_or_else(|| "not registered".to_string(), |p| p.to_string())
}
