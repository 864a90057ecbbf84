use sl_core::TrackingView;
use sl_sync::{ListingView, LoadingProgress, MirrorSnapshot, ProgressSink};
use std::sync::Mutex;

/// Prints the admin listing to stdout every time it is rendered.
#[derive(Default)]
pub struct ListingPrinter;

impl ListingView for ListingPrinter {
    fn render(&self, snapshot: &MirrorSnapshot) {
        println!("{}", format_listing(snapshot));
    }
}

pub fn format_listing(snapshot: &MirrorSnapshot) -> String {
    if snapshot.is_empty() {
        return "No tracking entries.".to_string();
    }
    snapshot
        .values()
        .map(|mirrored| {
            let marker = if mirrored.unsynced { " (not synced)" } else { "" };
            format!(
                "{:<16} {:<12} {}{}",
                mirrored.entry.number.as_str(),
                mirrored.entry.status_label(),
                mirrored.entry.destination.as_deref().unwrap_or("-"),
                marker
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_tracking(view: &TrackingView) -> String {
    let mut lines = vec![format!("Tracking {}  [{}]", view.number, view.status_text)];
    for row in &view.details {
        lines.push(format!("  {}: {}", row.label, row.value));
    }
    if !view.timeline.is_empty() {
        lines.push("Timeline:".to_string());
        for row in &view.timeline {
            let marker = match (row.highlighted, row.active) {
                (true, _) => ">",
                (false, true) => "*",
                (false, false) => " ",
            };
            let mut line = format!("  {marker} {:<16} {}", row.date, row.title);
            if !row.location.is_empty() {
                line.push_str(&format!(" ({})", row.location));
            }
            if !row.description.is_empty() {
                line.push_str(&format!(": {}", row.description));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// Writes one stderr line per loading stage.
#[derive(Default)]
pub struct StderrProgress {
    last_stage: Mutex<Option<usize>>,
}

impl ProgressSink for StderrProgress {
    fn progress(&self, update: &LoadingProgress) {
        let Ok(mut last) = self.last_stage.lock() else {
            return;
        };
        if *last != Some(update.stage) || update.percent == 100 {
            eprintln!("[{:>3}%] {}", update.percent, update.message);
            *last = Some(update.stage);
        }
    }
}
