//! Record model for parsed goroutine dumps.
//!
//! These types carry no behavior beyond small accessors; the parser is the
//! only producer and everything downstream treats them as read-only.

/// Source position of a call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

/// A function name plus where it was called, if known
///
/// `location` is `None` when the runtime printed an unavailable placeholder.
/// Equality and hashing then only see the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub name: String,
    pub location: Option<Location>,
}

impl CallSite {
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            location: Some(Location {
                file: file.into(),
                line,
            }),
        }
    }

    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.location.is_some()
    }
}

/// One entry of a goroutine's call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub call: CallSite,

    /// Argument words in printed order
    pub args: Vec<u64>,

    /// Frame was inlined into its caller
    pub inlined: bool,

    /// Runtime printed `...` instead of (some of) the arguments
    pub args_elided: bool,
}

impl Frame {
    pub fn new(call: CallSite) -> Self {
        Self {
            call,
            args: Vec::new(),
            inlined: false,
            args_elided: false,
        }
    }

    pub fn with_args(mut self, args: Vec<u64>) -> Self {
        self.args = args;
        self
    }

    pub fn is_unavailable(&self) -> bool {
        !self.call.is_available()
    }
}

/// A single goroutine from the dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goroutine {
    /// Unique within one dump only
    pub id: u64,

    pub status: String,

    /// Minutes spent in `status`; zero when the runtime did not report it
    pub minutes: u32,

    /// Locked to an OS thread
    pub locked: bool,

    /// Runtime elided further frames
    pub frames_elided: bool,

    /// The call that spawned this goroutine; `None` for the main goroutine
    pub created_by: Option<CallSite>,

    /// Id of the spawning goroutine, when the runtime prints it
    pub creator: Option<u64>,

    // innermost first, never empty
    stack: Vec<Frame>,
}

impl Goroutine {
    /// Build a goroutine; returns `None` for an empty stack.
    pub fn new(id: u64, status: impl Into<String>, stack: Vec<Frame>) -> Option<Self> {
        if stack.is_empty() {
            return None;
        }
        Some(Self {
            id,
            status: status.into(),
            minutes: 0,
            locked: false,
            frames_elided: false,
            created_by: None,
            creator: None,
            stack,
        })
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn with_created_by(mut self, created_by: CallSite) -> Self {
        self.created_by = Some(created_by);
        self
    }

    /// Innermost frame
    pub fn base(&self) -> &Frame {
        &self.stack[0]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.stack
    }
}

/// All goroutines of one dump, in parse order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dump {
    goroutines: Vec<Goroutine>,
}

impl Dump {
    pub fn new(goroutines: Vec<Goroutine>) -> Self {
        Self { goroutines }
    }

    pub fn goroutines(&self) -> &[Goroutine] {
        &self.goroutines
    }

    pub fn get(&self, index: usize) -> Option<&Goroutine> {
        self.goroutines.get(index)
    }

    pub fn len(&self) -> usize {
        self.goroutines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goroutines.is_empty()
    }
}
