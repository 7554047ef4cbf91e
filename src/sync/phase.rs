//! Pipeline phase inference from tool-related events.

use crate::api::{AgentEvent, EventKind};

/// Ordered pipeline stages, derived from which tools the agent has touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Search,
    Extract,
    Summarize,
    Report,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Self::Search, Self::Extract, Self::Summarize, Self::Report];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Extract => "extract",
            Self::Summarize => "summarize",
            Self::Report => "report",
        }
    }

    /// Position in the fixed stage order.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stage a tool name belongs to. Unknown tools map to nothing and
    /// contribute no rank.
    fn from_tool(name: &str) -> Option<Self> {
        match name {
            "search_videos" => Some(Self::Search),
            "extract_subtitle" => Some(Self::Extract),
            "summarize_video" => Some(Self::Summarize),
            "generate_report" => Some(Self::Report),
            _ => None,
        }
    }
}

/// Furthest-reached stage across the whole log, or `None` before any
/// tool activity.
///
/// This is a high-water mark, not a current-step tracker: any past occurrence
/// of a later-stage tool keeps the phase advanced even if the agent later
/// re-runs an earlier-stage tool (e.g. re-extracting a subtitle after
/// summarization has begun). Only `tool_call` and `tool_result` events count.
#[must_use]
pub fn infer_phase(events: &[AgentEvent]) -> Option<Phase> {
    events
        .iter()
        .filter(|e| matches!(e.event_type, EventKind::ToolCall | EventKind::ToolResult))
        .filter_map(|e| e.tool_name.as_deref().and_then(Phase::from_tool))
        .max()
}
