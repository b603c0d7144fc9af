//! Tool-calling support agent: a flight tool catalog, its executor, the
//! conversation log, and the session loop that ties them to a model.

mod catalog;
mod config;
mod conversation;
mod error;
mod executor;
mod phase;
mod prompt;
mod session;

pub use catalog::{
    ArgValue, ArgumentError, CatalogError, ParamSpec, ParamType, ToolArgs, ToolCatalog,
    ToolDefinition, GET_ALL_FLIGHTS, GET_FLIGHT_INFO, SEARCH_FLIGHTS_BY_ROUTE,
};
pub use config::{
    SessionConfig, DEFAULT_HISTORY_WINDOW, DEFAULT_LLM_TIMEOUT, DEFAULT_MAX_TOOL_ROUNDS,
    DEGRADED_REPLY, EMPTY_ANSWER_REPLY, TOOL_ROUND_CAP_REPLY,
};
pub use conversation::{ConversationError, ConversationState, ConversationTurn};
pub use error::{AgentError, FallbackReason};
pub use executor::{ToolCallRequest, ToolExecutor, ToolResult, ToolResultKind};
pub use phase::LoopPhase;
pub use prompt::DEFAULT_SYSTEM_PROMPT;
pub use session::{Session, TurnReport};
