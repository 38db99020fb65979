use log::info;

use crate::RunSummary;
use crate::utils::Colors;

use super::parse::ParseReport;
use super::sender::SendReport;
use super::walk::WalkReport;

/// Fold the stage reports into one summary. Call after every stage has joined.
pub fn summarize(
    walk: &WalkReport,
    parse: &ParseReport,
    send: &SendReport,
    cancelled: bool,
) -> RunSummary {
    RunSummary {
        discovered: walk.files,
        directories: walk.directories,
        traversal_errors: walk.errors,
        parsed: parse.parsed,
        decode_errors: parse.decode_errors,
        duplicates: parse.duplicates,
        batches_sent: send.batches_sent,
        records_sent: send.records_sent,
        send_errors: send.send_errors,
        records_lost: send.records_lost,
        cancelled: cancelled || send.cancelled,
    }
}

/// Log the post-run summary: one line of totals, one line of per-category failures.
pub fn log_run_summary(summary: &RunSummary) {
    info!(
        "Discovered {} files in {} directories; parsed {}; sent {} records in {} batches",
        summary.discovered,
        summary.directories,
        summary.parsed,
        summary.records_sent,
        summary.batches_sent
    );
    info!(
        "{} | {} | {} | {} | {}",
        Colors::colorize(
            Colors::FAILED,
            &format!("Traversal errors: {}", summary.traversal_errors),
            summary.traversal_errors
        ),
        Colors::colorize(
            Colors::FAILED,
            &format!("Decode errors: {}", summary.decode_errors),
            summary.decode_errors
        ),
        Colors::colorize(
            Colors::DROPPED,
            &format!("Duplicates: {}", summary.duplicates),
            summary.duplicates
        ),
        Colors::colorize(
            Colors::FAILED,
            &format!("Send errors: {}", summary.send_errors),
            summary.send_errors
        ),
        Colors::colorize(
            Colors::FAILED,
            &format!("Records lost: {}", summary.records_lost),
            summary.records_lost
        ),
    );
    if summary.failures() == 0 && !summary.cancelled {
        info!(
            "{}",
            Colors::colorize(Colors::OK, "All discovered files accounted for", 1)
        );
    }
}
