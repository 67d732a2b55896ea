//! Headless mode execution

use super::{
    SessionData,
    messages::{print_session_exit_success, print_session_shutdown, print_session_starting},
};
use crate::consts::cli_consts::headless;
use crate::events::Outcome;
use crate::models::{DashboardSnapshot, fmt_yen};
use crate::runtime::ApiCommand;
use std::error::Error;

/// Runs the application in headless mode
///
/// This function handles:
/// 1. Console event logging
/// 2. Periodic snapshot refreshes
/// 3. Ctrl+C shutdown handling
pub async fn run_headless_mode(
    mut session: SessionData,
    refresh_secs: u64,
) -> Result<(), Box<dyn Error>> {
    // Print session start message
    print_session_starting("headless", &session.base_url);

    // Trigger shutdown on Ctrl+C
    let shutdown_sender_clone = session.shutdown_sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_sender_clone.send(());
        }
    });

    let mut shutdown_receiver = session.shutdown_sender.subscribe();

    // Initial fetch, then refresh on an interval
    let _ = session.command_sender.send(ApiCommand::FetchSnapshot).await;
    let mut refresh = tokio::time::interval(headless::refresh_interval(refresh_secs));
    refresh.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    refresh.tick().await; // first tick completes immediately

    // Event loop: log events to console until shutdown
    loop {
        tokio::select! {
            Some(event) = session.event_receiver.recv() => {
                if event.should_display() {
                    println!("{}", event);
                }
                if let Some(Outcome::SnapshotFetched(snapshot)) = event.outcome {
                    print_snapshot_summary(&snapshot);
                }
            }
            _ = refresh.tick() => {
                let _ = session.command_sender.send(ApiCommand::FetchSnapshot).await;
            }
            _ = shutdown_receiver.recv() => {
                break;
            }
        }
    }

    // Wait for background tasks to finish
    print_session_shutdown();
    for handle in session.join_handles {
        let _ = handle.await;
    }
    print_session_exit_success();

    Ok(())
}

/// Print a compact text rendering of the snapshot for console monitoring.
fn print_snapshot_summary(snapshot: &DashboardSnapshot) {
    println!(
        "  Month: day {} of {} ({} days remaining)",
        snapshot.current_day, snapshot.days_in_month, snapshot.days_remaining
    );
    println!(
        "  Overall: {} of {} ({:.1}%)",
        fmt_yen(snapshot.total_earned),
        fmt_yen(snapshot.total_goal),
        snapshot.overall_progress
    );
    for progress in &snapshot.sources {
        println!(
            "  - {}: {} / {} ({:.1}%), pace {}/day",
            progress.source.name,
            fmt_yen(progress.earned_amount),
            fmt_yen(progress.source.goal_amount),
            progress.progress_percent,
            fmt_yen(progress.required_daily_pace)
        );
    }
    for plan in &snapshot.recovery_plans {
        println!(
            "  ! {}: short {} - {}",
            plan.income_name,
            fmt_yen(plan.shortfall),
            plan.catch_up_message
        );
    }
}
