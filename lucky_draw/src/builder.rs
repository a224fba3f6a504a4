pub use crate::config::*;

use snafu::{ensure, OptionExt, Snafu};
use std::collections::HashSet;

/// Errors when assembling a participant set by hand.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
pub enum BuilderError {
    #[snafu(display("Participant {number} has a blank name"))]
    BlankName { number: i64 },
    #[snafu(display("Number {number} is already taken"))]
    NumberTaken { number: i64 },
}

/// A builder for assembling a set of participants without going through a file.
///
/// The same rules as for parsing apply: names are trimmed and must not be blank,
/// numbers must be unique.
///
/// ```
/// use lucky_draw::builder::Builder;
/// # use lucky_draw::builder::BuilderError;
///
/// let mut builder = Builder::new();
/// builder.add(1, "Anna")?;
/// builder.add(2, " Bob ")?;
/// assert!(builder.add(2, "Clara").is_err());
///
/// let participants = builder.build();
/// assert_eq!(participants.get(2).map(|p| p.name()), Some("Bob"));
///
/// # Ok::<(), BuilderError>(())
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    _participants: Vec<Participant>,
    _numbers: HashSet<i64>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Adds a participant at the end of the set.
    pub fn add(&mut self, number: i64, name: &str) -> Result<&mut Builder, BuilderError> {
        let participant = Participant::new(number, name).context(BlankNameSnafu { number })?;
        ensure!(
            !self._numbers.contains(&number),
            NumberTakenSnafu { number }
        );
        self._numbers.insert(number);
        self._participants.push(participant);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self._participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self._participants.is_empty()
    }

    pub fn build(self) -> ParticipantSet {
        ParticipantSet {
            participants: self._participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_order() {
        let mut builder = Builder::new();
        builder.add(3, "Carol").unwrap().add(1, "Alice").unwrap();
        let ps = builder.build();
        let numbers: Vec<i64> = ps.iter().map(|p| p.number()).collect();
        assert_eq!(numbers, vec![3, 1]);
    }

    #[test]
    fn builder_rejects_invalid_entries() {
        let mut builder = Builder::new();
        builder.add(1, "Alice").unwrap();
        assert_eq!(
            builder.add(2, "   ").unwrap_err(),
            BuilderError::BlankName { number: 2 }
        );
        assert_eq!(
            builder.add(1, "Bob").unwrap_err(),
            BuilderError::NumberTaken { number: 1 }
        );
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn builder_matches_parser() {
        let mut builder = Builder::new();
        builder.add(1, "Alice").unwrap().add(2, "Bob").unwrap();
        let parsed = crate::parse("number,name\n1,Alice\n2,Bob\n").unwrap();
        assert_eq!(builder.build(), parsed);
    }
}
