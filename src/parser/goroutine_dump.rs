//! Parser for goroutine dumps.
//!
//! Turns the text a Go runtime prints for "dump all goroutines" (deadlock
//! detection, SIGQUIT, crash handlers) into a [`Dump`].
//!
//! The stream is a sequence of blocks separated by blank lines:
//!
//! ```text
//! goroutine 7 [chan receive, 12 minutes, locked to thread]:
//! main.worker(0xc000010000, ...)
//!         /src/w.go:10 +0x1d
//! ...additional frames elided...
//! created by main.start in goroutine 1
//!         /src/m.go:22 +0x3c
//! ```

use super::schema::{CallSite, Dump, Frame, Goroutine, Location};
use crate::utils::config::UNAVAILABLE_MARKERS;
use crate::utils::error::{ParseError, ParseErrorKind};
use log::{debug, warn};
use std::borrow::Cow;

/// What to do with a block that does not follow the dump grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorruptionPolicy {
    /// Abort the whole parse on the first malformed block
    #[default]
    Fatal,
    /// Skip malformed blocks and keep going
    Lenient,
}

/// A block dropped under [`CorruptionPolicy::Lenient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    /// 1-based line the block starts on
    pub line: usize,
    pub error: ParseError,
}

/// Result of a successful parse
///
/// An empty `dump` is a valid outcome, not an error.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub dump: Dump,
    pub skipped: Vec<SkippedBlock>,
}

/// A single input line with its position
#[derive(Debug)]
struct Line<'a> {
    number: usize,
    offset: usize,
    text: Cow<'a, str>,
}

impl Line<'_> {
    fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn is_indented(&self) -> bool {
        self.text.starts_with('\t') || self.text.starts_with(' ')
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(self.number, self.offset, kind)
    }
}

/// Parse a goroutine dump
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `input` - Raw dump bytes; invalid UTF-8 is replaced lossily
/// * `policy` - How to treat malformed blocks
///
/// # Errors
/// Under [`CorruptionPolicy::Fatal`], the first structural violation.
/// Under [`CorruptionPolicy::Lenient`] this never fails; bad blocks are
/// reported in [`ParseOutcome::skipped`].
pub fn parse(input: &[u8], policy: CorruptionPolicy) -> Result<ParseOutcome, ParseError> {
    let lines = split_lines(input);
    debug!("Parsing {} lines ({} bytes) with {:?} policy", lines.len(), input.len(), policy);

    let mut goroutines = Vec::new();
    let mut skipped = Vec::new();

    for block in split_blocks(&lines) {
        match parse_block(block) {
            Ok(goroutine) => goroutines.push(goroutine),
            Err(error) => match policy {
                CorruptionPolicy::Fatal => return Err(error),
                CorruptionPolicy::Lenient => {
                    warn!("Skipping block at line {}: {}", block[0].number, error);
                    skipped.push(SkippedBlock {
                        line: block[0].number,
                        error,
                    });
                }
            },
        }
    }

    debug!("Parsed {} goroutines, skipped {} blocks", goroutines.len(), skipped.len());

    Ok(ParseOutcome {
        dump: Dump::new(goroutines),
        skipped,
    })
}

fn split_lines(input: &[u8]) -> Vec<Line<'_>> {
    let mut offset = 0;
    let mut lines = Vec::new();

    for (index, raw) in input.split(|b| *b == b'\n').enumerate() {
        let trimmed = raw.strip_suffix(b"\r").unwrap_or(raw);
        lines.push(Line {
            number: index + 1,
            offset,
            text: String::from_utf8_lossy(trimmed),
        });
        offset += raw.len() + 1;
    }

    lines
}

// Runs of blank lines collapse into one separator.
fn split_blocks<'l, 'a>(lines: &'l [Line<'a>]) -> Vec<&'l [Line<'a>]> {
    let mut blocks = Vec::new();
    let mut start = None;

    for (index, line) in lines.iter().enumerate() {
        if line.is_blank() {
            if let Some(begin) = start.take() {
                blocks.push(&lines[begin..index]);
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        blocks.push(&lines[begin..]);
    }

    blocks
}

fn parse_block(block: &[Line<'_>]) -> Result<Goroutine, ParseError> {
    let mut lines = block.iter();
    let header_line = match lines.next() {
        Some(line) => line,
        None => return Err(ParseError::new(0, 0, ParseErrorKind::MissingHeader(String::new()))),
    };
    let header = parse_header(header_line)?;

    let mut stack = Vec::new();
    let mut frames_elided = false;
    let mut created_by = None;
    let mut creator = None;

    while let Some(line) = lines.next() {
        let text = line.text.as_ref();

        if created_by.is_some() || line.is_indented() {
            return Err(line.error(ParseErrorKind::UnexpectedLine(text.to_string())));
        }

        if let Some(rest) = text.strip_prefix("created by ") {
            let (name, parent) = parse_creator(rest, line)?;
            let location_line = match lines.next() {
                Some(next) if next.is_indented() => next,
                _ => return Err(line.error(ParseErrorKind::MissingCreatorLocation(name))),
            };
            let location = parse_location(location_line)?;
            created_by = Some(CallSite { name, location });
            creator = parent;
            continue;
        }

        // outer frames printed after the marker are not part of the stack
        if frames_elided {
            if lines.as_slice().first().is_some_and(|next| next.is_indented()) {
                lines.next();
            }
            continue;
        }

        if is_elision_marker(text) {
            frames_elided = true;
            continue;
        }

        let mut frame = parse_function_line(line)?;
        let location_line = match lines.next() {
            Some(next) if next.is_indented() => next,
            _ => return Err(line.error(ParseErrorKind::MissingLocation(frame.call.name))),
        };
        frame.call.location = parse_location(location_line)?;
        stack.push(frame);
    }

    let mut goroutine = Goroutine::new(header.id, header.status, stack)
        .ok_or_else(|| header_line.error(ParseErrorKind::EmptyStack(header.id)))?;
    goroutine.minutes = header.minutes;
    goroutine.locked = header.locked;
    goroutine.frames_elided = frames_elided;
    goroutine.created_by = created_by;
    goroutine.creator = creator;

    Ok(goroutine)
}

#[derive(Debug)]
struct Header {
    id: u64,
    status: String,
    minutes: u32,
    locked: bool,
}

/// `goroutine <id> [<status>(, <N> minutes)?(, locked to thread)?]:`
fn parse_header(line: &Line<'_>) -> Result<Header, ParseError> {
    let text = line.text.trim_end();
    let malformed = || line.error(ParseErrorKind::MalformedHeader(text.to_string()));

    let rest = text
        .strip_prefix("goroutine ")
        .ok_or_else(|| line.error(ParseErrorKind::MissingHeader(text.to_string())))?;
    let open = rest.find('[').ok_or_else(malformed)?;
    let close = rest.rfind("]:").ok_or_else(malformed)?;
    if close < open {
        return Err(malformed());
    }

    // newer runtimes print `gp=0x.. m=..` between the id and the bracket
    let id_text = rest[..open].split_whitespace().next().ok_or_else(malformed)?;
    let id = id_text.parse::<u64>().map_err(|_| {
        line.error(ParseErrorKind::InvalidInteger {
            text: id_text.to_string(),
            context: "goroutine id",
        })
    })?;

    let mut clauses = rest[open + 1..close].split(',').map(str::trim);
    let status = match clauses.next() {
        Some(status) if !status.is_empty() => status.to_string(),
        _ => return Err(malformed()),
    };

    let mut minutes = 0;
    let mut locked = false;
    for clause in clauses {
        if let Some(count) = clause
            .strip_suffix(" minutes")
            .or_else(|| clause.strip_suffix(" minute"))
        {
            minutes = count.trim().parse::<u32>().map_err(|_| {
                line.error(ParseErrorKind::InvalidInteger {
                    text: count.to_string(),
                    context: "minutes",
                })
            })?;
        } else if clause == "locked to thread" {
            locked = true;
        } else {
            debug!("line {}: ignoring header clause {:?}", line.number, clause);
        }
    }

    Ok(Header {
        id,
        status,
        minutes,
        locked,
    })
}

fn is_elision_marker(text: &str) -> bool {
    let text = text.trim();
    text.len() > 6 && text.starts_with("...") && text.ends_with("...") && text.contains("elided")
}

/// `<name>(<args>)` with an optional trailing ` (inline)`
fn parse_function_line(line: &Line<'_>) -> Result<Frame, ParseError> {
    let mut text = line.text.trim_end();
    let mut inlined = false;
    if let Some(stripped) = text.strip_suffix(" (inline)") {
        text = stripped;
        inlined = true;
    }

    let (name, args_text) = if text.ends_with(')') {
        let open = matching_open_paren(text)
            .ok_or_else(|| line.error(ParseErrorKind::MalformedFunction(text.to_string())))?;
        (&text[..open], Some(&text[open + 1..text.len() - 1]))
    } else {
        (text, None)
    };

    if name.is_empty() {
        return Err(line.error(ParseErrorKind::MalformedFunction(text.to_string())));
    }

    let (args, args_elided) = match args_text {
        Some(args_text) => parse_args(args_text, line)?,
        None => (Vec::new(), false),
    };

    Ok(Frame {
        call: CallSite::unavailable(name),
        args,
        inlined,
        args_elided,
    })
}

// Names may themselves contain parens, e.g. `main.(*T).run`.
fn matching_open_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in text.char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_args(text: &str, line: &Line<'_>) -> Result<(Vec<u64>, bool), ParseError> {
    let mut args = Vec::new();
    let mut elided = false;

    for token in text.split(',') {
        let token = token.trim().trim_matches(|c| c == '{' || c == '}').trim();
        match token {
            "" | "_" => {}
            "..." => elided = true,
            word => args.push(parse_word(word.trim_end_matches('?'), line)?),
        }
    }

    Ok((args, elided))
}

fn parse_word(text: &str, line: &Line<'_>) -> Result<u64, ParseError> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|_| {
        line.error(ParseErrorKind::InvalidInteger {
            text: text.to_string(),
            context: "argument",
        })
    })
}

/// `\t<file>:<line> +0x<hex>`, or an unavailable placeholder
fn parse_location(line: &Line<'_>) -> Result<Option<Location>, ParseError> {
    let text = line.text.trim();
    if UNAVAILABLE_MARKERS.contains(&text) {
        return Ok(None);
    }

    // drop `+0x..` and anything after it (`fp= sp= pc=`)
    let text = match text.find(" +0x") {
        Some(index) => &text[..index],
        None => text,
    };

    let (file, line_text) = text
        .rsplit_once(':')
        .filter(|(file, _)| !file.is_empty())
        .ok_or_else(|| line.error(ParseErrorKind::MalformedLocation(text.to_string())))?;

    let line_no = line_text.trim().parse::<u32>().map_err(|_| {
        line.error(ParseErrorKind::InvalidInteger {
            text: line_text.to_string(),
            context: "line number",
        })
    })?;

    Ok(Some(Location {
        file: file.to_string(),
        line: line_no,
    }))
}

/// `<name>` or `<name> in goroutine <id>`
fn parse_creator(text: &str, line: &Line<'_>) -> Result<(String, Option<u64>), ParseError> {
    match text.rsplit_once(" in goroutine ") {
        Some((name, id)) => {
            let id = id.trim().parse::<u64>().map_err(|_| {
                line.error(ParseErrorKind::InvalidInteger {
                    text: id.to_string(),
                    context: "creator goroutine id",
                })
            })?;
            Ok((name.trim().to_string(), Some(id)))
        }
        None => Ok((text.trim().to_string(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str) -> Line<'_> {
        Line {
            number: 1,
            offset: 0,
            text: Cow::Borrowed(text),
        }
    }

    #[test]
    fn test_parse_header_with_all_clauses() {
        let text = "goroutine 42 [chan receive, 17 minutes, locked to thread]:";
        let header = parse_header(&line(text)).unwrap();
        assert_eq!(header.id, 42);
        assert_eq!(header.status, "chan receive");
        assert_eq!(header.minutes, 17);
        assert!(header.locked);
    }

    #[test]
    fn test_parse_header_clauses_are_independent() {
        let header = parse_header(&line("goroutine 3 [semacquire, locked to thread]:")).unwrap();
        assert_eq!(header.minutes, 0);
        assert!(header.locked);

        let header = parse_header(&line("goroutine 3 [select, 1 minutes]:")).unwrap();
        assert_eq!(header.minutes, 1);
        assert!(!header.locked);
    }

    #[test]
    fn test_parse_header_tolerates_scheduler_fields() {
        let text = "goroutine 1 gp=0xc000002380 m=0 mp=0x6f4f40 [running]:";
        let header = parse_header(&line(text)).unwrap();
        assert_eq!(header.id, 1);
        assert_eq!(header.status, "running");
    }

    #[test]
    fn test_parse_header_rejects_bad_minutes() {
        let err = parse_header(&line("goroutine 1 [select, x minutes]:")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidInteger { context: "minutes", .. }));
    }

    #[test]
    fn test_parse_header_missing() {
        let err = parse_header(&line("panic: oh no")).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::MissingHeader(_)));
    }

    #[test]
    fn test_parse_args_variants() {
        let l = line("");
        assert_eq!(parse_args("", &l).unwrap(), (vec![], false));
        assert_eq!(parse_args("...", &l).unwrap(), (vec![], true));
        assert_eq!(parse_args("0x1, 10", &l).unwrap(), (vec![1, 10], false));
        assert_eq!(
            parse_args("{0x4b0e60?, 0xc000012345?}, ...", &l).unwrap(),
            (vec![0x4b0e60, 0xc000012345], true)
        );
        assert!(parse_args("0xzz", &l).is_err());
    }

    #[test]
    fn test_parse_function_line_with_receiver() {
        let text = "main.(*Server).Serve(0xc0000a4000, {0x1, 0x2})";
        let frame = parse_function_line(&line(text)).unwrap();
        assert_eq!(frame.call.name, "main.(*Server).Serve");
        assert_eq!(frame.args, vec![0xc0000a4000, 1, 2]);
        assert!(!frame.inlined);
    }

    #[test]
    fn test_parse_function_line_inline() {
        let frame = parse_function_line(&line("main.helper(...) (inline)")).unwrap();
        assert_eq!(frame.call.name, "main.helper");
        assert!(frame.inlined);
        assert!(frame.args_elided);
    }

    #[test]
    fn test_parse_location_forms() {
        let loc = parse_location(&line("\t/src/w.go:10 +0x1d")).unwrap().unwrap();
        assert_eq!(loc.file, "/src/w.go");
        assert_eq!(loc.line, 10);

        let loc = parse_location(&line("\tC:/go/src/w.go:7")).unwrap().unwrap();
        assert_eq!(loc.file, "C:/go/src/w.go");

        let loc = parse_location(&line("\t/a.go:3 +0x2 fp=0xc sp=0xc pc=0x4")).unwrap().unwrap();
        assert_eq!(loc.line, 3);

        assert_eq!(parse_location(&line("\t<not available>")).unwrap(), None);
        assert!(parse_location(&line("\tnowhere")).is_err());
    }

    #[test]
    fn test_split_blocks_ignores_repeated_blank_lines() {
        let input = b"a\n\n\n\nb\nc\n\n";
        let lines = split_lines(input);
        let blocks = split_blocks(&lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].len(), 2);
        assert_eq!(blocks[1][0].number, 5);
        assert_eq!(blocks[1][0].offset, 5);
    }

    #[test]
    fn test_parse_creator_with_parent() {
        let (name, parent) = parse_creator("main.start in goroutine 1", &line("")).unwrap();
        assert_eq!(name, "main.start");
        assert_eq!(parent, Some(1));
    }
}
