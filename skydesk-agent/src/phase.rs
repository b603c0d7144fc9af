use serde::{Deserialize, Serialize};

/// Where a turn is in the request, execute, follow-up cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    AwaitingUserInput,
    RequestingCompletion,
    DirectAnswer,
    ToolCallsPending,
    ExecutingTools,
    RequestingFollowup,
    FinalAnswer,
    Fallback,
}

impl LoopPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LoopPhase::DirectAnswer | LoopPhase::FinalAnswer | LoopPhase::Fallback
        )
    }
}
