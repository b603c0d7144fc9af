use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use skydesk_core::ToolCall;
use skydesk_flights::{FlightRecord, FlightStore};

use crate::catalog::{
    ToolArgs, ToolCatalog, GET_ALL_FLIGHTS, GET_FLIGHT_INFO, SEARCH_FLIGHTS_BY_ROUTE,
};

/// A call as the model requested it, before validation.
pub type ToolCallRequest = ToolCall;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolResultKind {
    Success,
    NotFound,
    NoResults,
    InvalidArguments,
    UnknownTool,
}

/// Outcome of one tool call. Every call yields exactly one of these, failures
/// included, so the model always sees a reply for each id it sent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub kind: ToolResultKind,
    pub content: String,
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            ToolResultKind::InvalidArguments | ToolResultKind::UnknownTool
        )
    }
}

enum FlightTool {
    Info,
    Route,
    All,
}

impl FlightTool {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            GET_FLIGHT_INFO => Some(Self::Info),
            SEARCH_FLIGHTS_BY_ROUTE => Some(Self::Route),
            GET_ALL_FLIGHTS => Some(Self::All),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ToolExecutor {
    store: Arc<FlightStore>,
    catalog: ToolCatalog,
}

impl ToolExecutor {
    pub fn new(store: Arc<FlightStore>) -> Self {
        Self {
            store,
            catalog: ToolCatalog::flight_tools(),
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &FlightStore {
        &self.store
    }

    /// Runs one call against the flight store. Never fails: bad input becomes an
    /// error result the model can read.
    pub fn execute(&self, call: &ToolCallRequest) -> ToolResult {
        let (kind, content) = self.dispatch(call);
        tracing::info!(
            tool = %call.name,
            call_id = %call.id,
            outcome = ?kind,
            "executed tool call"
        );
        ToolResult {
            call_id: call.id.clone(),
            tool_name: call.name.clone(),
            kind,
            content,
        }
    }

    /// Executes a batch concurrently. Results come back in request order.
    pub async fn execute_all(&self, calls: &[ToolCallRequest]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| async move { self.execute(call) })).await
    }

    fn dispatch(&self, call: &ToolCallRequest) -> (ToolResultKind, String) {
        let (Some(tool), Some(definition)) =
            (FlightTool::from_name(&call.name), self.catalog.get(&call.name))
        else {
            return (
                ToolResultKind::UnknownTool,
                format!(
                    "Unknown tool: {}. Available tools: {}",
                    call.name,
                    self.catalog.names().join(", ")
                ),
            );
        };

        let args = match definition.validate(&call.args) {
            Ok(args) => args,
            Err(err) => {
                return (
                    ToolResultKind::InvalidArguments,
                    format!("Invalid arguments for {}: {err}", call.name),
                )
            }
        };

        match tool {
            FlightTool::Info => self.flight_info(&args),
            FlightTool::Route => self.route_search(&args),
            FlightTool::All => self.all_flights(),
        }
    }

    fn flight_info(&self, args: &ToolArgs) -> (ToolResultKind, String) {
        let flight_number = args.str("flight_number").unwrap_or_default();
        match self.store.lookup_by_number(flight_number) {
            Some(record) => (ToolResultKind::Success, record.to_string()),
            None => (
                ToolResultKind::NotFound,
                format!(
                    "Flight {flight_number} not found in our system. \
                     Please verify the flight number or contact customer service."
                ),
            ),
        }
    }

    fn route_search(&self, args: &ToolArgs) -> (ToolResultKind, String) {
        let departure = args.str("departure_city").unwrap_or_default();
        let arrival = args.str("arrival_city").unwrap_or_default();
        let matches = self.store.search_by_route(departure, arrival);

        if matches.is_empty() {
            return (
                ToolResultKind::NoResults,
                format!("No flights found from {departure} to {arrival}."),
            );
        }

        let header = format!(
            "Found {} flight(s) from {departure} to {arrival}:",
            matches.len()
        );
        (ToolResultKind::Success, listing(header, matches))
    }

    fn all_flights(&self) -> (ToolResultKind, String) {
        let records = self.store.list_all();
        if records.is_empty() {
            return (
                ToolResultKind::NoResults,
                "No flights are currently scheduled.".to_string(),
            );
        }

        let header = format!("All available flights ({} total):", records.len());
        (ToolResultKind::Success, listing(header, records.iter()))
    }
}

fn listing<'a>(header: String, records: impl IntoIterator<Item = &'a FlightRecord>) -> String {
    let mut out = header;
    for record in records {
        out.push_str("\n\n");
        out.push_str(&record.to_string());
    }
    out
}
