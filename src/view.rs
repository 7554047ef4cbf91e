//! Plain-text rendering for the watch stream.

use crate::api::{AgentEvent, EventKind, Task, TaskStatus, Video};
use crate::sync::{Phase, ProgressStats};

/// Longest event line before truncation.
const PREVIEW_LEN: usize = 160;

pub fn format_event(event: &AgentEvent) -> String {
    match event.event_type {
        EventKind::Thinking => format!("  · {}", preview(&event.content)),
        EventKind::ToolCall => {
            let tool = event.tool_name.as_deref().unwrap_or("?");
            match compact_args(event.tool_args_json.as_deref()) {
                Some(args) => format!("→ {tool} {}", preview(&args)),
                None => format!("→ {tool}"),
            }
        }
        EventKind::ToolResult => {
            let tool = event.tool_name.as_deref().unwrap_or("?");
            let body = event
                .tool_result_preview
                .as_deref()
                .unwrap_or(&event.content);
            format!("← {tool}: {}", preview(body))
        }
        EventKind::Error => format!("✗ {}", preview(&event.content)),
        EventKind::Complete => format!("✓ {}", preview(&event.content)),
    }
}

pub fn format_status(task: &Task, phase: Option<Phase>, stats: &ProgressStats) -> String {
    let mut head = format!("[{}", task.status.label());
    if task.status == TaskStatus::Running {
        head.push_str(&format!(" {:.0}%", task.progress));
    }
    head.push(']');

    let phase_label = match phase {
        Some(p) => format!("{} ({}/{})", p.label(), p.index() + 1, Phase::ALL.len()),
        None => "-".to_string(),
    };
    format!(
        "{head} phase: {phase_label} | videos {} · subtitles {} · summaries {}",
        stats.videos_found, stats.subtitles_extracted, stats.summaries_completed,
    )
}

pub fn format_video(video: &Video) -> String {
    format!("- {} — {} ({})", video.title, video.author, video.url)
}

/// Tool args arrive as opaque JSON text; compact them when they parse,
/// show them raw when they don't.
fn compact_args(args: Option<&str>) -> Option<String> {
    let raw = args?;
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => Some(value.to_string()),
        Err(_) => Some(raw.to_string()),
    }
}

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or("");
    truncate(line, PREVIEW_LEN)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}…")
    }
}
