//! Progress counters parsed from tool result text.
//!
//! The backend reports results as human-readable strings (Chinese, with the
//! English forms accepted too), so these counters are best-effort telemetry:
//! anything that does not match is skipped, never an error.

use crate::api::{AgentEvent, EventKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Matches "found 8 items" and the backend's "找到 8 个视频".
static FOUND_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:found|找到)\s*(\d+)\s*(?:items?|个)").expect("found-count pattern")
});

/// Counters derived from the event log. Each is non-decreasing as the log
/// grows, since derivation only ever adds per matching event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub videos_found: u64,
    pub subtitles_extracted: u64,
    pub summaries_completed: u64,
}

/// Derives counters from an event log.
///
/// Kept behind a trait so the text matching can be swapped for a structured
/// field if the event schema ever grows one, without touching the poller or
/// phase inference.
pub trait StatExtractor: Send + Sync {
    fn extract(&self, events: &[AgentEvent]) -> ProgressStats;
}

/// Default extractor: token matching over result content.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextStatExtractor;

impl StatExtractor for TextStatExtractor {
    fn extract(&self, events: &[AgentEvent]) -> ProgressStats {
        let mut stats = ProgressStats::default();

        for event in events {
            if event.event_type != EventKind::ToolResult {
                continue;
            }
            let Some(tool) = event.tool_name.as_deref() else {
                continue;
            };
            match tool {
                // Additive: each search result event can contribute a count.
                "search_videos" => {
                    if let Some(cap) = FOUND_COUNT.captures(&event.content)
                        && let Ok(n) = cap[1].parse::<u64>()
                    {
                        stats.videos_found += n;
                    }
                }
                "extract_subtitle" => {
                    if has_token(&event.content, "success", "成功") {
                        stats.subtitles_extracted += 1;
                    }
                }
                "summarize_video" => {
                    if has_token(&event.content, "complete", "完成") {
                        stats.summaries_completed += 1;
                    }
                }
                _ => {}
            }
        }

        stats
    }
}

fn has_token(content: &str, ascii: &str, localized: &str) -> bool {
    content.contains(localized) || content.to_lowercase().contains(ascii)
}
