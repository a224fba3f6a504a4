// ********* Input data structures ***********

use snafu::{ensure, Snafu};
use std::fmt::Display;

/// The canonical header of the column holding the participant numbers.
pub const NUMBER_COLUMN: &str = "number";
/// The canonical header of the column holding the participant names.
pub const NAME_COLUMN: &str = "name";

/// A single entry of the raffle.
///
/// The name is always trimmed and never empty. Participants cannot be modified
/// after construction.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Participant {
    number: i64,
    name: String,
}

impl Participant {
    /// Creates a participant, or `None` if the name is blank once trimmed.
    pub fn new(number: i64, name: &str) -> Option<Participant> {
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(Participant {
                number,
                name: name.to_string(),
            })
        }
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.number, self.name)
    }
}

/// The pool of participants, in the order of the input.
///
/// Invariant: no two participants share the same number.
/// A set can only be obtained from the parser or from the [`crate::builder::Builder`],
/// which both enforce this invariant.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParticipantSet {
    pub(crate) participants: Vec<Participant>,
}

impl ParticipantSet {
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.participants.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.participants
    }

    /// The participant registered under this number, if any.
    pub fn get(&self, number: i64) -> Option<&Participant> {
        self.participants.iter().find(|p| p.number == number)
    }

    pub fn contains(&self, participant: &Participant) -> bool {
        self.get(participant.number) == Some(participant)
    }
}

impl<'a> IntoIterator for &'a ParticipantSet {
    type Item = &'a Participant;
    type IntoIter = std::slice::Iter<'a, Participant>;

    fn into_iter(self) -> Self::IntoIter {
        self.participants.iter()
    }
}

/// Why a data row was left out of the participant set.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RejectReason {
    /// The number field (given here verbatim) does not start with an integer.
    InvalidNumber(String),
    /// The name field is empty after trimming.
    BlankName,
}

/// A data row that was silently dropped by the parser.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RejectedRow {
    /// The line of the row in the input, starting at 1 for the header.
    pub line: u64,
    pub reason: RejectReason,
}

/// The outcome of a successful parse.
///
/// The rejected rows are informative only: they never turn a successful parse
/// into a failure.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParseReport {
    pub participants: ParticipantSet,
    pub rejected: Vec<RejectedRow>,
}

// ********* Configuration **********

/// Controls how the raw text is read.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParseOptions {
    /// The accepted headers for the number column. The comparison ignores case and
    /// surrounding whitespace.
    pub number_columns: Vec<String>,
    /// The accepted headers for the name column.
    pub name_columns: Vec<String>,
    /// The field separator.
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            number_columns: vec![NUMBER_COLUMN.to_string(), "번호".to_string()],
            name_columns: vec![NAME_COLUMN.to_string(), "이름".to_string()],
            delimiter: b',',
        }
    }
}

// ******** Draw data structures *********

/// A validated request for a draw.
///
/// Invariant: `1 <= requested_winners <= pool_size`.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct DrawRequest {
    pool_size: usize,
    requested_winners: usize,
}

impl DrawRequest {
    /// Checks the preconditions of a draw, in order: the pool must not be empty,
    /// at least one winner must be requested, and no more winners than participants.
    pub fn new(pool_size: usize, requested_winners: i64) -> Result<DrawRequest, DrawError> {
        ensure!(pool_size > 0, EmptyPoolSnafu {});
        ensure!(
            requested_winners >= 1,
            InvalidCountSnafu {
                requested: requested_winners
            }
        );
        match usize::try_from(requested_winners) {
            Ok(count) if count <= pool_size => Ok(DrawRequest {
                pool_size,
                requested_winners: count,
            }),
            _ => InsufficientPoolSnafu {
                requested: requested_winners,
                available: pool_size,
            }
            .fail(),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn requested_winners(&self) -> usize {
        self.requested_winners
    }
}

/// The winners of one draw, in the order they were drawn.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawResult {
    pub(crate) winners: Vec<Participant>,
}

impl DrawResult {
    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Participant> {
        self.winners.iter()
    }

    pub fn as_slice(&self) -> &[Participant] {
        &self.winners
    }

    /// The winners with their position, starting at 1.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &Participant)> + '_ {
        self.winners.iter().enumerate().map(|(idx, p)| (idx + 1, p))
    }

    pub fn into_vec(self) -> Vec<Participant> {
        self.winners
    }
}

// ********* Errors **********

/// Errors that prevent a participant list from being accepted.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ParseError {
    #[snafu(display(
        "The file must contain a \"number\" column and a \"name\" column (found: {})",
        found.join(", ")
    ))]
    MissingColumns { found: Vec<String> },

    #[snafu(display("The file could not be read: {source}"))]
    MalformedInput { source: csv::Error },

    #[snafu(display(
        "The file contains duplicated numbers: {}",
        numbers.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
    ))]
    DuplicateNumber { numbers: Vec<i64> },
}

/// Errors that prevent a draw from taking place.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
pub enum DrawError {
    #[snafu(display("There are no participants"))]
    EmptyPool {},

    #[snafu(display("At least one winner must be drawn (requested: {requested})"))]
    InvalidCount { requested: i64 },

    #[snafu(display(
        "More winners requested ({requested}) than there are participants ({available})"
    ))]
    InsufficientPool { requested: i64, available: usize },
}
