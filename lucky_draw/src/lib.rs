mod config;
use log::{debug, info, warn};

use rand::seq::SliceRandom;
use rand::Rng;
use snafu::{ensure, ResultExt};
use std::collections::HashSet;

pub use crate::config::*;

pub mod builder;
pub mod manual;
pub mod session;

/// Reads a participant list with the default options.
///
/// The input is delimited text whose first row is a header containing a
/// `number` and a `name` column. Rows with an invalid number or a blank name are
/// silently dropped. Any duplicated number rejects the whole input.
///
/// ```
/// let participants = lucky_draw::parse("number,name\n1,Alice\n2,Bob\n")?;
/// assert_eq!(participants.len(), 2);
/// # Ok::<(), lucky_draw::ParseError>(())
/// ```
pub fn parse(raw: &str) -> Result<ParticipantSet, ParseError> {
    parse_with_options(raw, &ParseOptions::default()).map(|report| report.participants)
}

/// Reads a participant list and reports the rows that were dropped.
///
/// Arguments:
/// * `raw` the full content of the file
/// * `options` the accepted column headers and the field separator
pub fn parse_with_options(raw: &str, options: &ParseOptions) -> Result<ParseReport, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter)
        .from_reader(raw.as_bytes());

    // All the records are read before looking at the header: a malformed file is
    // reported as such, even if it also misses some columns.
    let headers = reader.headers().context(MalformedInputSnafu {})?.clone();
    let records: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .context(MalformedInputSnafu {})?;
    debug!(
        "parse_with_options: headers: {:?}, {} records",
        headers,
        records.len()
    );

    let found: Vec<String> = headers.iter().map(normalize_header).collect();
    let (number_idx, name_idx) = match (
        find_column(&found, &options.number_columns),
        find_column(&found, &options.name_columns),
    ) {
        (Some(number_idx), Some(name_idx)) => (number_idx, name_idx),
        _ => return MissingColumnsSnafu { found }.fail(),
    };

    let mut participants: Vec<Participant> = Vec::new();
    let mut rejected: Vec<RejectedRow> = Vec::new();
    for record in records.iter() {
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let raw_number = record.get(number_idx).unwrap_or_default();
        let raw_name = record.get(name_idx).unwrap_or_default();
        let number = coerce_number(raw_number);
        let reason = match (number, number.and_then(|n| Participant::new(n, raw_name))) {
            (_, Some(p)) => {
                participants.push(p);
                continue;
            }
            (None, _) => RejectReason::InvalidNumber(raw_number.to_string()),
            (Some(_), None) => RejectReason::BlankName,
        };
        debug!("parse_with_options: line {}: dropping row: {:?}", line, reason);
        rejected.push(RejectedRow { line, reason });
    }

    let duplicates = find_duplicates(&participants);
    ensure!(
        duplicates.is_empty(),
        DuplicateNumberSnafu {
            numbers: duplicates
        }
    );

    if !rejected.is_empty() {
        warn!("Dropped {} invalid rows", rejected.len());
    }
    info!("Read {} participants", participants.len());
    Ok(ParseReport {
        participants: ParticipantSet { participants },
        rejected,
    })
}

/// Draws `requested_winners` distinct participants from the pool.
///
/// The preconditions are checked in order and the first failure is returned:
/// the pool is not empty, at least one winner is requested, and the pool is large
/// enough. The pool itself is never modified.
pub fn draw(pool: &ParticipantSet, requested_winners: i64) -> Result<DrawResult, DrawError> {
    draw_with_rng(pool, requested_winners, &mut rand::rng())
}

/// Same as [`draw`], with a caller-provided source of randomness.
///
/// Every participant has the same probability to be drawn, and every ordering of
/// the winners is equally likely. Use a seeded generator to reproduce a draw:
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let pool = lucky_draw::parse("number,name\n1,Alice\n2,Bob\n3,Carol\n")?;
/// let first = lucky_draw::draw_with_rng(&pool, 2, &mut StdRng::seed_from_u64(7))?;
/// let second = lucky_draw::draw_with_rng(&pool, 2, &mut StdRng::seed_from_u64(7))?;
/// assert_eq!(first, second);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn draw_with_rng<R: Rng + ?Sized>(
    pool: &ParticipantSet,
    requested_winners: i64,
    rng: &mut R,
) -> Result<DrawResult, DrawError> {
    let request = DrawRequest::new(pool.len(), requested_winners)?;
    info!(
        "Drawing {} winners out of {} participants",
        request.requested_winners(),
        request.pool_size()
    );

    // Partial Fisher-Yates: only the first positions get shuffled into place.
    let mut candidates: Vec<Participant> = pool.participants.clone();
    let (winners, _) = candidates.partial_shuffle(rng, request.requested_winners());
    let winners = winners.to_vec();

    for (idx, w) in winners.iter().enumerate() {
        debug!("draw_with_rng: winner {}: {}", idx + 1, w);
    }
    Ok(DrawResult { winners })
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

fn find_column(headers: &[String], accepted: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| accepted.iter().any(|a| normalize_header(a) == *h))
}

/// Coerces the start of a field to an integer.
///
/// Leading whitespace and a sign are accepted, and reading stops at the first
/// character that is not a digit: `" 12abc"` is 12, `"3.7"` is 3, `"abc"` is rejected.
fn coerce_number(field: &str) -> Option<i64> {
    let s = field.trim_start();
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if negative {
        format!("-{}", digits).parse::<i64>().ok()
    } else {
        digits.parse::<i64>().ok()
    }
}

/// The numbers seen more than once, each reported a single time.
fn find_duplicates(participants: &[Participant]) -> Vec<i64> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut duplicates: Vec<i64> = Vec::new();
    for p in participants {
        if !seen.insert(p.number()) && !duplicates.contains(&p.number()) {
            duplicates.push(p.number());
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn names(ps: &[Participant]) -> Vec<&str> {
        ps.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn parse_simple() {
        init();
        let ps = parse("number,name\n1,Alice\n2,Bob\n3,Carol").unwrap();
        assert_eq!(names(ps.as_slice()), vec!["Alice", "Bob", "Carol"]);
        assert_eq!(ps.get(2).map(|p| p.name()), Some("Bob"));
    }

    #[test]
    fn parse_headers_are_trimmed_and_case_insensitive() {
        init();
        let ps = parse(" Name , NUMBER \n  Alice  ,7\n").unwrap();
        assert_eq!(ps.len(), 1);
        assert_eq!(ps.as_slice()[0].number(), 7);
        assert_eq!(ps.as_slice()[0].name(), "Alice");
    }

    #[test]
    fn parse_korean_headers() {
        init();
        let ps = parse("번호,이름\n1,김철수\n2,이영희\n").unwrap();
        assert_eq!(names(ps.as_slice()), vec!["김철수", "이영희"]);
    }

    #[test]
    fn parse_missing_columns() {
        init();
        let res = parse("id,full_name\n1,Alice\n");
        assert!(matches!(res, Err(ParseError::MissingColumns { .. })));
        let res = parse("number,email\n1,a@b.c\n");
        assert!(matches!(res, Err(ParseError::MissingColumns { .. })));
        let res = parse("");
        assert!(matches!(res, Err(ParseError::MissingColumns { .. })));
    }

    #[test]
    fn parse_malformed() {
        init();
        let res = parse("number,name\n1,Alice\n2,Bob,extra\n");
        assert!(matches!(res, Err(ParseError::MalformedInput { .. })));
        // Malformed takes precedence over the missing columns.
        let res = parse("id,full_name\n1\n");
        assert!(matches!(res, Err(ParseError::MalformedInput { .. })));
    }

    #[test]
    fn parse_duplicates_reject_everything() {
        init();
        let res = parse("number,name\n1,Alice\n2,Bob\n2,Carol\n4,Dave");
        match res {
            Err(ParseError::DuplicateNumber { numbers }) => assert_eq!(numbers, vec![2]),
            x => panic!("unexpected result {:?}", x),
        }
        // Position of the duplicate does not matter.
        let res = parse("number,name\n9,Alice\n2,Bob\n3,Carol\n9,Dave");
        assert!(matches!(res, Err(ParseError::DuplicateNumber { .. })));
    }

    #[test]
    fn parse_duplicates_after_coercion() {
        init();
        let res = parse("number,name\n5,Alice\n5.0,Bob\n");
        assert!(matches!(res, Err(ParseError::DuplicateNumber { .. })));
    }

    #[test]
    fn parse_dropped_rows_do_not_count_as_duplicates() {
        init();
        let ps = parse("number,name\n1,Alice\n1,   \n2,Bob\n").unwrap();
        assert_eq!(names(ps.as_slice()), vec!["Alice", "Bob"]);
    }

    #[test]
    fn parse_drops_invalid_rows() {
        init();
        let report = parse_with_options(
            "number,name\nabc,Alice\n2,  \n3, Carol \n,Dave\n",
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(names(report.participants.as_slice()), vec!["Carol"]);
        assert_eq!(
            report.rejected,
            vec![
                RejectedRow {
                    line: 2,
                    reason: RejectReason::InvalidNumber("abc".to_string())
                },
                RejectedRow {
                    line: 3,
                    reason: RejectReason::BlankName
                },
                RejectedRow {
                    line: 5,
                    reason: RejectReason::InvalidNumber("".to_string())
                },
            ]
        );
    }

    #[test]
    fn parse_header_only() {
        init();
        let ps = parse("number,name\n").unwrap();
        assert!(ps.is_empty());
    }

    #[test]
    fn parse_skips_empty_lines() {
        init();
        let ps = parse("number,name\n\n1,Alice\n\n2,Bob\n\n").unwrap();
        assert_eq!(ps.len(), 2);
    }

    #[test]
    fn parse_custom_options() {
        init();
        let options = ParseOptions {
            number_columns: vec!["Ticket".to_string()],
            name_columns: vec!["Holder".to_string()],
            delimiter: b';',
        };
        let report = parse_with_options("ticket;holder\n10;Alice\n11;Bob\n", &options).unwrap();
        assert_eq!(names(report.participants.as_slice()), vec!["Alice", "Bob"]);
        assert!(report.rejected.is_empty());
    }

    #[test]
    fn parse_is_idempotent() {
        init();
        let input = "number,name\n3,Carol\n1,Alice\n2,Bob\n";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }

    #[test]
    fn coerce_number_prefix() {
        assert_eq!(coerce_number("12"), Some(12));
        assert_eq!(coerce_number("  12abc"), Some(12));
        assert_eq!(coerce_number("3.7"), Some(3));
        assert_eq!(coerce_number("-4"), Some(-4));
        assert_eq!(coerce_number("+4"), Some(4));
        assert_eq!(coerce_number("abc"), None);
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("-"), None);
        assert_eq!(coerce_number("99999999999999999999"), None);
    }

    #[test]
    fn draw_simple() {
        init();
        let pool = parse("number,name\n1,Alice\n2,Bob\n3,Carol").unwrap();
        let res = draw(&pool, 2).unwrap();
        assert_eq!(res.len(), 2);
        assert_ne!(res.as_slice()[0], res.as_slice()[1]);
        assert!(res.iter().all(|w| pool.contains(w)));
        let positions: Vec<usize> = res.ranked().map(|(pos, _)| pos).collect();
        assert_eq!(positions, vec![1, 2]);
    }

    #[test]
    fn draw_whole_pool() {
        init();
        let pool = parse("number,name\n1,Alice\n2,Bob\n3,Carol").unwrap();
        let res = draw(&pool, 3).unwrap();
        let mut drawn: Vec<i64> = res.iter().map(|p| p.number()).collect();
        drawn.sort();
        assert_eq!(drawn, vec![1, 2, 3]);
    }

    #[test]
    fn draw_preconditions() {
        init();
        let empty = ParticipantSet::default();
        assert_eq!(draw(&empty, 0), Err(DrawError::EmptyPool {}));
        assert_eq!(draw(&empty, 1), Err(DrawError::EmptyPool {}));

        let pool = parse("number,name\n1,Alice\n2,Bob").unwrap();
        assert_eq!(draw(&pool, 0), Err(DrawError::InvalidCount { requested: 0 }));
        assert_eq!(
            draw(&pool, -3),
            Err(DrawError::InvalidCount { requested: -3 })
        );
        assert_eq!(
            draw(&pool, 3),
            Err(DrawError::InsufficientPool {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(
            draw(&pool, i64::MAX),
            Err(DrawError::InsufficientPool {
                requested: i64::MAX,
                available: 2
            })
        );
    }

    #[test]
    fn draw_leaves_pool_untouched() {
        init();
        let pool = parse("number,name\n1,Alice\n2,Bob\n3,Carol\n4,Dave").unwrap();
        let before = pool.clone();
        for _ in 0..20 {
            draw(&pool, 2).unwrap();
        }
        assert_eq!(pool, before);
    }

    #[test]
    fn draw_seeded_is_reproducible() {
        init();
        let pool = parse("number,name\n1,A\n2,B\n3,C\n4,D\n5,E\n6,F").unwrap();
        let a = draw_with_rng(&pool, 4, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = draw_with_rng(&pool, 4, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn draw_is_fair() {
        init();
        let pool = parse("number,name\n1,A\n2,B\n3,C\n4,D\n5,E").unwrap();
        let mut rng = StdRng::seed_from_u64(1234);
        let num_draws = 20_000;
        let k = 2;
        let mut selected: HashMap<i64, u32> = HashMap::new();
        let mut first: HashMap<i64, u32> = HashMap::new();
        for _ in 0..num_draws {
            let res = draw_with_rng(&pool, k, &mut rng).unwrap();
            for w in res.iter() {
                *selected.entry(w.number()).or_insert(0) += 1;
            }
            *first.entry(res.as_slice()[0].number()).or_insert(0) += 1;
        }
        // Expected frequency k / n = 0.4, standard deviation is about 0.0035.
        for p in pool.iter() {
            let freq = selected[&p.number()] as f64 / num_draws as f64;
            assert!((freq - 0.4).abs() < 0.03, "{}: {}", p, freq);
            // The first winner is not biased toward the input order either.
            let freq_first = first[&p.number()] as f64 / num_draws as f64;
            assert!((freq_first - 0.2).abs() < 0.03, "{}: {}", p, freq_first);
        }
    }

    #[test]
    fn parse_then_draw_property() {
        init();
        let pool = parse("number,name\n1,A\n2,B\n3,C\n4,D\n5,E\n6,F\n7,G").unwrap();
        let mut rng = StdRng::seed_from_u64(99);
        for k in 1..=pool.len() as i64 {
            let res = draw_with_rng(&pool, k, &mut rng).unwrap();
            assert_eq!(res.len() as i64, k);
            let distinct: HashSet<i64> = res.iter().map(|p| p.number()).collect();
            assert_eq!(distinct.len() as i64, k);
            assert!(res.iter().all(|w| pool.contains(w)));
        }
    }
}
