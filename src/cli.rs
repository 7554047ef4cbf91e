//! Command-line interface and command runners.

use crate::api::{ApiClient, NewTask, TaskBackend, TaskStatus};
use crate::config::Config;
use crate::error::Result;
use crate::sync::TaskSession;
use crate::view;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;

/// How often the watch loop repaints from the shared snapshot.
const RENDER_PERIOD: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "vidwatch", version, about = "Follow video-analysis tasks from the terminal")]
pub struct Cli {
    /// Backend base URL (overrides the config file).
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit a new analysis task and follow it.
    Run {
        /// Search query to analyze.
        query: String,
        /// Video platform (defaults to the config value).
        #[arg(long)]
        platform: Option<String>,
        /// Max videos to analyze (defaults to the config value).
        #[arg(long)]
        max_videos: Option<u32>,
    },
    /// Attach to an existing task and follow it to a terminal state.
    Watch { id: i64 },
    /// Retry a failed or cancelled task, then follow it.
    Retry { id: i64 },
    /// Cancel a pending or running task.
    Cancel { id: i64 },
    /// Print the stored report for a finished task.
    Report { id: i64 },
    /// List recent tasks, newest first.
    List {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Delete a task and everything stored for it.
    Delete { id: i64 },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    let client = Arc::new(ApiClient::new(&config.server_url, config.request_timeout())?);

    match cli.command {
        Commands::Run {
            query,
            platform,
            max_videos,
        } => {
            let new = NewTask {
                query,
                platform: platform.unwrap_or_else(|| config.platform.clone()),
                max_videos: max_videos.unwrap_or(config.max_videos),
            };
            let task = client.create_task(&new).await?;
            println!("task {} created: {}", task.id, task.query);
            watch(client, &config, task.id, false).await
        }
        Commands::Watch { id } => watch(client, &config, id, false).await,
        Commands::Retry { id } => watch(client, &config, id, true).await,
        Commands::Cancel { id } => {
            let task = client.cancel_task(id).await?;
            println!("task {} is now {}", task.id, task.status.label());
            Ok(())
        }
        Commands::Report { id } => {
            let report = client.get_report(id).await?;
            println!("{}", report.content_markdown);
            Ok(())
        }
        Commands::List { limit } => {
            let page = client.list_tasks(0, limit).await?;
            for task in &page.tasks {
                println!(
                    "{:>5}  {:<9}  {}  {}",
                    task.id,
                    task.status.label(),
                    task.created_at.format("%Y-%m-%d %H:%M"),
                    task.query,
                );
            }
            println!("{} of {} tasks", page.tasks.len(), page.total);
            Ok(())
        }
        Commands::Delete { id } => {
            client.delete_task(id).await?;
            println!("task {id} deleted");
            Ok(())
        }
    }
}

/// Drive a synchronization session and echo its progress until the task
/// reaches a terminal state or the user detaches with ctrl-c.
async fn watch(client: Arc<ApiClient>, config: &Config, task_id: i64, retry_first: bool) -> Result<()> {
    let mut session = TaskSession::start(client, task_id, config.poll_interval(), config.notice_ttl());
    if retry_first {
        session.retry().await;
    }

    let mut printed_events = 0;
    let mut last_status_line = String::new();
    let mut last_notice = String::new();
    let mut ticker = tokio::time::interval(RENDER_PERIOD);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                session.stop();
                println!("\ndetached; the task keeps running server-side");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let snap = session.snapshot();

        for event in &snap.events[printed_events..] {
            println!("{}", view::format_event(event));
        }
        printed_events = snap.events.len();

        if let Some(notice) = session.notices.current()
            && notice != last_notice
        {
            println!("! {notice}");
            last_notice = notice.to_string();
        }

        let Some(task) = &snap.task else { continue };

        let status_line = view::format_status(task, snap.phase, &snap.stats);
        if status_line != last_status_line {
            println!("{status_line}");
            last_status_line = status_line;
        }

        if !task.status.is_terminal() {
            continue;
        }
        // The round that observed `done` may still be fetching the report.
        if task.status == TaskStatus::Done && snap.report.is_none() && session.is_polling() {
            continue;
        }

        match task.status {
            TaskStatus::Done => {
                if !snap.videos.is_empty() {
                    println!("\nanalyzed videos:");
                    for video in &snap.videos {
                        println!("{}", view::format_video(video));
                    }
                }
                if let Some(report) = &snap.report {
                    println!("\n{}", report.content_markdown);
                }
            }
            TaskStatus::Failed => {
                let reason = task.error_message.as_deref().unwrap_or("unknown error");
                println!("task failed: {reason}");
                println!("run `vidwatch retry {task_id}` to start it over");
            }
            TaskStatus::Cancelled => println!("task cancelled"),
            TaskStatus::Pending | TaskStatus::Running => {}
        }

        session.stop();
        return Ok(());
    }
}
