//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::num::ParseIntError;
use thiserror::Error;

/// Structural violation found while parsing a goroutine dump
///
/// `line` is 1-based, `offset` is the byte offset of the start of that line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line} (byte {offset}): {kind}")]
pub struct ParseError {
    pub line: usize,
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, offset: usize, kind: ParseErrorKind) -> Self {
        Self { line, offset, kind }
    }
}

/// What went wrong at a [`ParseError`] position
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("expected goroutine header, found {0:?}")]
    MissingHeader(String),

    #[error("malformed goroutine header {0:?}")]
    MalformedHeader(String),

    #[error("unexpected line {0:?}")]
    UnexpectedLine(String),

    #[error("malformed function line {0:?}")]
    MalformedFunction(String),

    #[error("frame {0:?} has no location line")]
    MissingLocation(String),

    #[error("malformed location line {0:?}")]
    MalformedLocation(String),

    #[error("invalid integer {text:?} in {context}")]
    InvalidInteger { text: String, context: &'static str },

    #[error("goroutine {0} has no frames")]
    EmptyStack(u64),

    #[error("created by {0:?} has no location line")]
    MissingCreatorLocation(String),
}

/// Errors produced by interactive commands. None of these end the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unrecognized command {0:?}")]
    Unrecognized(String),

    #[error("command {0:?} needs a number")]
    MissingArgument(&'static str),

    #[error("command {0:?} takes no argument")]
    UnexpectedArgument(&'static str),

    #[error("unable to parse number {text:?} for command {keyword:?}: {source}")]
    InvalidNumber {
        keyword: &'static str,
        text: String,
        #[source]
        source: ParseIntError,
    },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
