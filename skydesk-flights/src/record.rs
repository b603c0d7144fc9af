use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
}

impl FlightRecord {
    pub fn new(
        flight_number: impl Into<String>,
        departure_city: impl Into<String>,
        arrival_city: impl Into<String>,
        departure_time: impl Into<String>,
        arrival_time: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            flight_number: flight_number.into(),
            departure_city: departure_city.into(),
            arrival_city: arrival_city.into(),
            departure_time: departure_time.into(),
            arrival_time: arrival_time.into(),
            status: status.into(),
            gate: None,
            terminal: None,
        }
    }

    pub fn with_gate(mut self, gate: impl Into<String>) -> Self {
        self.gate = Some(gate.into());
        self
    }

    pub fn with_terminal(mut self, terminal: impl Into<String>) -> Self {
        self.terminal = Some(terminal.into());
        self
    }

    pub(crate) fn departs_from(&self, query: &str) -> bool {
        endpoint_matches(&self.departure_city, query)
    }

    pub(crate) fn arrives_at(&self, query: &str) -> bool {
        endpoint_matches(&self.arrival_city, query)
    }
}

impl fmt::Display for FlightRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Flight {}:\n• Route: {} → {}\n• Departure: {}\n• Arrival: {}\n• Status: {}",
            self.flight_number,
            self.departure_city,
            self.arrival_city,
            self.departure_time,
            self.arrival_time,
            self.status
        )?;
        if let Some(terminal) = &self.terminal {
            write!(f, "\n• Terminal: {terminal}")?;
        }
        if let Some(gate) = &self.gate {
            write!(f, "\n• Gate: {gate}")?;
        }
        Ok(())
    }
}

pub(crate) fn normalize_flight_number(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

pub(crate) fn normalize_city(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// An endpoint such as `New York (JFK)` answers to its full name, the city part
/// (`new york`) and the airport code (`jfk`). A blank query matches any endpoint.
fn endpoint_matches(endpoint: &str, query: &str) -> bool {
    let query = normalize_city(query);
    if query.is_empty() {
        return true;
    }

    let full = normalize_city(endpoint);
    if full == query {
        return true;
    }

    match endpoint.split_once('(') {
        Some((city, rest)) => {
            let code = rest.trim_end().trim_end_matches(')');
            normalize_city(city) == query || normalize_city(code) == query
        }
        None => false,
    }
}
