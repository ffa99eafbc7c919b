//! Plain-text rendering of snapshots.

use crate::aggregator::Grouped;
use crate::parser::schema::CallSite;
use crate::utils::config::UNAVAILABLE_PLACEHOLDER;
use std::fmt::Write;

const NO_GROUPS: &str = "no groups remaining";

/// One-line summary of a snapshot
///
/// **Public** - printed after every command that changes the snapshot
pub fn summary(grouped: &Grouped) -> String {
    let totals = grouped.totals();
    if totals.is_empty() {
        return NO_GROUPS.to_string();
    }
    format!("[{} groups, {} goroutines]", totals.groups, totals.goroutines)
}

/// Render every group of a snapshot
///
/// **Public** - main entry point for the `p`/`pf` commands
///
/// # Arguments
/// * `grouped` - Snapshot to render
/// * `short` - Only show the first two frames of each group
///
/// Each group shows its size, the minute range of its members and the
/// stack of its first member.
pub fn render(grouped: &Grouped, short: bool) -> String {
    if grouped.is_empty() {
        return format!("{}\n", NO_GROUPS);
    }

    let mut out = String::new();
    for group in grouped.groups() {
        let range = group.minute_range();
        let rep = group.representative();
        let frames = rep.frames();

        // writing into a String cannot fail
        let _ = writeln!(out, "» {} [minutes min {} max {}]", group.len(), range.min, range.max);

        if short {
            for frame in frames.iter().take(2) {
                write_call(&mut out, &frame.call);
            }
            if frames.len() > 2 {
                let _ = writeln!(out, "› {} frames skipped", frames.len() - 2);
            }
        } else {
            for frame in frames {
                write_call(&mut out, &frame.call);
            }
            if rep.frames_elided {
                out.push_str("...additional frames elided...\n");
            }
        }

        match &rep.created_by {
            Some(call) => {
                out.push_str("created by ");
                write_call(&mut out, call);
                out.push('\n');
            }
            None => out.push('\n'),
        }
    }
    out
}

fn write_call(out: &mut String, call: &CallSite) {
    let _ = match &call.location {
        Some(loc) => writeln!(out, "{}\n\t{}:{}", call.name, loc.file, loc.line),
        None => writeln!(out, "{}\n\t{}", call.name, UNAVAILABLE_PLACEHOLDER),
    };
}
