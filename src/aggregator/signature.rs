//! Equality keys for coalescing goroutines.
//!
//! Two keys exist:
//! - the full signature, the exact text of status plus every frame location
//! - the "ends", the innermost call site paired with the creator call site

use crate::parser::schema::{CallSite, Goroutine};
use crate::utils::config::UNAVAILABLE_PLACEHOLDER;
use std::fmt::Write;

/// Rough coalescing key
///
/// Goroutines with equal ends are doing the same kind of wait for the
/// same reason, whatever lies between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ends<'a> {
    pub top: &'a CallSite,
    pub bottom: Option<&'a CallSite>,
}

impl Goroutine {
    /// Innermost call site paired with the creator call site
    pub fn ends(&self) -> Ends<'_> {
        Ends {
            top: &self.base().call,
            bottom: self.created_by.as_ref(),
        }
    }

    /// Canonical text of status and every frame's name and location
    ///
    /// Argument values and the inline/elision flags are left out, so calls
    /// differing only in arguments produce the same signature. Names and
    /// files never contain newlines and a location always contains `:`,
    /// which keeps the rendering unambiguous.
    pub fn full_signature(&self) -> String {
        let frames = self.frames();
        let capacity = self.status.len()
            + 1
            + frames
                .iter()
                .map(|f| {
                    let location = match &f.call.location {
                        Some(loc) => loc.file.len() + 11,
                        None => UNAVAILABLE_PLACEHOLDER.len(),
                    };
                    f.call.name.len() + location + 3
                })
                .sum::<usize>();

        let mut out = String::with_capacity(capacity);
        out.push_str(&self.status);
        out.push('\n');
        for frame in frames {
            out.push_str(&frame.call.name);
            out.push_str("\n\t");
            match &frame.call.location {
                Some(loc) => {
                    // writing into a String cannot fail
                    let _ = write!(out, "{}:{}", loc.file, loc.line);
                }
                None => out.push_str(UNAVAILABLE_PLACEHOLDER),
            }
            out.push('\n');
        }
        out
    }
}
