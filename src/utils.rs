// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Misc utility functions.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::ParseIntError;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use thiserror::Error;

const ONE_YEAR_SECS: u64 = 31_536_000;

/// Failure to load an observation file.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid 32-bit integer: {source}")]
    Parse { line: usize, source: ParseIntError },
    #[error("no observations in input")]
    Empty,
}

/// Parse newline separated decimal u32s. Blank lines are skipped.
pub fn parse_observations(reader: impl BufRead) -> Result<Vec<u32>, InputError> {
    let mut observations = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<u32>().map_err(|source| InputError::Parse {
            line: index + 1,
            source,
        })?;
        observations.push(value);
    }
    if observations.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(observations)
}

/// Load the observation file handed to -i.
pub fn read_observations(path: &Path) -> Result<Vec<u32>, InputError> {
    let file = File::open(path)?;
    parse_observations(BufReader::new(file))
}

/// Seed interval for -u: one year either side of the current unix time.
pub fn unix_time_window() -> (u32, u32) {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let lower = now.saturating_sub(ONE_YEAR_SECS).min(u32::MAX as u64) as u32;
    let upper = now.saturating_add(ONE_YEAR_SECS).min(u32::MAX as u64) as u32;
    (lower, upper)
}

/// Format a duration into a short human readable string.
pub fn format_elapsed_time(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else if secs >= 1 {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn observations_parse_one_value_per_line() {
        let input = Cursor::new("123\n456\n\n4294967295\n");
        assert_eq!(
            parse_observations(input).unwrap(),
            vec![123, 456, 4_294_967_295]
        );
    }

    #[test]
    fn malformed_lines_report_their_position() {
        let input = Cursor::new("1\nnope\n3\n");
        match parse_observations(input) {
            Err(InputError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            parse_observations(Cursor::new("\n\n")),
            Err(InputError::Empty)
        ));
    }

    #[test]
    fn unix_window_spans_two_years() {
        let (lower, upper) = unix_time_window();
        assert!(lower < upper);
        assert_eq!(upper as u64 - lower as u64, 2 * ONE_YEAR_SECS);
    }

    #[test]
    fn elapsed_times_render_compactly() {
        assert_eq!(format_elapsed_time(Duration::from_millis(45)), "45ms");
        assert_eq!(format_elapsed_time(Duration::from_secs(5)), "5.00s");
        assert_eq!(format_elapsed_time(Duration::from_secs(125)), "2m05s");
    }
}
