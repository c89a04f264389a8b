//! REPL command parsing.

use std::str::FromStr;

use tapride_core::payment::PaymentMethod;
use tapride_core::place::Point;

/// Slash commands offered for completion and hints.
pub const COMMANDS: [&str; 13] = [
    "/tap", "/pickup", "/dropoff", "/confirm", "/reset", "/home", "/fav", "/pay", "/outing",
    "/status", "/history", "/help", "/quit",
];

/// What the user can do on the single screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Tap the map at a coordinate.
    Tap(Point),
    Pickup,
    Dropoff,
    Confirm,
    Reset,
    /// Register the candidate as home, optionally naming it.
    Home(Option<String>),
    HomeClear,
    /// Add the candidate as a favorite, optionally naming it.
    Favorite(Option<String>),
    FavoritesClear,
    /// Set a payment method, or toggle when none is given.
    Pay(Option<PaymentMethod>),
    Outing(OutingAction),
    Status,
    History,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutingAction {
    /// Reopen the prompt.
    Open,
    On,
    Off,
    Dismiss,
}

/// Answer given while the outing-mode prompt is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Yes,
    No,
    /// Anything else closes the prompt without choosing.
    Dismiss,
}

impl PromptAnswer {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Self::Yes,
            "n" | "no" => Self::No,
            _ => Self::Dismiss,
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match name {
            "/tap" => parse_point(rest).map(Command::Tap),
            "/pickup" => Ok(Command::Pickup),
            "/dropoff" => Ok(Command::Dropoff),
            "/confirm" => Ok(Command::Confirm),
            "/reset" => Ok(Command::Reset),
            "/home" if rest == "clear" => Ok(Command::HomeClear),
            "/home" => Ok(Command::Home(arg)),
            "/fav" if rest == "clear" => Ok(Command::FavoritesClear),
            "/fav" => Ok(Command::Favorite(arg)),
            "/pay" if rest.is_empty() => Ok(Command::Pay(None)),
            "/pay" => rest.parse().map(|method| Command::Pay(Some(method))),
            "/outing" => match rest {
                "" => Ok(Command::Outing(OutingAction::Open)),
                "on" => Ok(Command::Outing(OutingAction::On)),
                "off" => Ok(Command::Outing(OutingAction::Off)),
                "dismiss" => Ok(Command::Outing(OutingAction::Dismiss)),
                other => Err(format!("Unknown outing option: {}", other)),
            },
            "/status" => Ok(Command::Status),
            "/history" => Ok(Command::History),
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            "" => Err("Empty command".to_string()),
            other => Err(format!("Unknown command: {} (try /help)", other)),
        }
    }
}

/// Parses `"<lat> <lng>"` (a comma between the two is accepted).
fn parse_point(args: &str) -> Result<Point, String> {
    let parts: Vec<&str> = args
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .collect();
    let [lat, lng] = parts.as_slice() else {
        return Err("Usage: /tap <lat> <lng>".to_string());
    };

    let lat: f64 = lat.parse().map_err(|_| format!("Invalid latitude: {}", lat))?;
    let lng: f64 = lng.parse().map_err(|_| format!("Invalid longitude: {}", lng))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Latitude out of range: {}", lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("Longitude out of range: {}", lng));
    }
    Ok(Point::new(lat, lng))
}

pub const HELP: &str = "\
/tap <lat> <lng>    pick a point on the map
/pickup             use the picked point as pickup
/dropoff            use the picked point as drop-off
/confirm            confirm the reservation
/reset              clear the draft
/home [name]        register the picked point as home
/home clear         unregister home
/fav [name]         add the picked point to favorites
/fav clear          remove all favorites
/pay [cash|cashless]  set payment method (toggles without argument)
/outing [on|off|dismiss]  outing mode prompt
/status             show the current state
/history            show recent reservations
/quit               exit";
