use std::collections::HashMap;

use thiserror::Error;

use crate::record::{normalize_flight_number, FlightRecord};
use crate::sample::sample_flights;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlightStoreError {
    #[error("flight number must not be empty or whitespace")]
    BlankFlightNumber,
    #[error("duplicate flight number: {0}")]
    DuplicateFlightNumber(String),
}

/// Read-only flight table, indexed by normalized flight number.
#[derive(Clone, Debug)]
pub struct FlightStore {
    records: Vec<FlightRecord>,
    by_number: HashMap<String, usize>,
}

impl FlightStore {
    pub fn new(records: impl IntoIterator<Item = FlightRecord>) -> Result<Self, FlightStoreError> {
        let records: Vec<FlightRecord> = records.into_iter().collect();
        let mut by_number = HashMap::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            let key = normalize_flight_number(&record.flight_number);
            if key.is_empty() {
                return Err(FlightStoreError::BlankFlightNumber);
            }
            if by_number.insert(key, index).is_some() {
                return Err(FlightStoreError::DuplicateFlightNumber(
                    record.flight_number.clone(),
                ));
            }
        }

        Ok(Self { records, by_number })
    }

    /// The built-in demo schedule.
    pub fn sample() -> Self {
        let records = sample_flights();
        let by_number = records
            .iter()
            .enumerate()
            .map(|(index, record)| (normalize_flight_number(&record.flight_number), index))
            .collect();
        Self { records, by_number }
    }

    pub fn lookup_by_number(&self, flight_number: &str) -> Option<&FlightRecord> {
        self.by_number
            .get(&normalize_flight_number(flight_number))
            .map(|&index| &self.records[index])
    }

    pub fn search_by_route(&self, departure_city: &str, arrival_city: &str) -> Vec<&FlightRecord> {
        self.records
            .iter()
            .filter(|record| record.departs_from(departure_city) && record.arrives_at(arrival_city))
            .collect()
    }

    pub fn list_all(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
