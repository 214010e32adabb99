//! Delimited event-record strings
//!
//! Records look like `"0.cisplatin;0.pemetrexed;21.cisplatin;"`: events
//! separated by `;`, each event `<time>.<label>`. The time is a plain
//! decimal (`21`, `0.5`); its fractional part is only taken when another
//! `.` and a non-empty label follow, so `3.5fu` is time 3 with label `5fu`
//! while `3.5.drug` is time 3.5 with label `drug`.

use std::str::FromStr;

use crate::error::{TswError, TswResult};
use crate::types::{AlignedToken, Event, Sequence};

pub const EVENT_SEPARATOR: char = ';';
pub const TIME_SEPARATOR: char = '.';

/// Parse a record string into a sequence
pub fn parse_record(record: &str) -> TswResult<Sequence> {
    record
        .split(EVENT_SEPARATOR)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(pos, token)| parse_event(token).map_err(|e| annotate(e, pos, token)))
        .collect::<TswResult<Vec<Event>>>()
        .map(Sequence::new)
}

fn parse_event(token: &str) -> TswResult<Event> {
    let (time, label) = split_time(token).ok_or_else(|| {
        TswError::malformed("expected '<time>.<label>' with a non-negative decimal time")
    })?;

    let time: f64 = time
        .parse()
        .map_err(|_| TswError::malformed(format!("invalid time '{}'", time)))?;
    if !time.is_finite() {
        return Err(TswError::malformed(format!("time must be finite, got {}", time)));
    }

    let label = label.trim();
    if label.is_empty() {
        return Err(TswError::malformed("empty label"));
    }

    Ok(Event::new(time, label))
}

/// Split `<digits>[.<digits>].<label>` into its time and label parts
fn split_time(token: &str) -> Option<(&str, &str)> {
    let int_len = leading_digits(token);
    if int_len == 0 || !token[int_len..].starts_with(TIME_SEPARATOR) {
        return None;
    }

    let rest = &token[int_len + 1..];
    if label_reads_as_fraction(rest) {
        let frac_len = leading_digits(rest);
        Some((&token[..int_len + 1 + frac_len], &rest[frac_len + 1..]))
    } else {
        Some((&token[..int_len], rest))
    }
}

fn leading_digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

/// Whether `s` starts with `<digits>.` followed by something more
pub(crate) fn label_reads_as_fraction(s: &str) -> bool {
    let digits = leading_digits(s);
    digits > 0 && s[digits..].starts_with(TIME_SEPARATOR) && s.len() > digits + 1
}

fn annotate(err: TswError, pos: usize, token: &str) -> TswError {
    match err {
        TswError::MalformedRecord(msg) => {
            TswError::malformed(format!("event {} ('{}'): {}", pos + 1, token, msg))
        }
        other => other,
    }
}

/// Render a sequence in record form, with the trailing separator
pub fn format_record(sequence: &Sequence) -> String {
    sequence
        .iter()
        .map(|e| format!("{}{}", e, EVENT_SEPARATOR))
        .collect()
}

/// Render aligned tokens joined by `;`, gaps as `__`
pub fn format_aligned(tokens: &[AlignedToken]) -> String {
    tokens
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(&EVENT_SEPARATOR.to_string())
}

impl FromStr for Sequence {
    type Err = TswError;

    fn from_str(s: &str) -> TswResult<Self> {
        parse_record(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_regimen_record() {
        let seq = parse_record("0.cisplatin;0.pemetrexed;21.cisplatin;0.pemetrexed;").unwrap();
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.events[2], Event::new(21.0, "cisplatin"));
    }

    #[test]
    fn test_parse_tolerates_whitespace_and_missing_trailer() {
        let seq = " 14.pemetrexed ; 14.pemetrexed".parse::<Sequence>().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.events[1].label, "pemetrexed");
    }

    #[test]
    fn test_fractional_times_and_dotted_labels() {
        let seq = parse_record("3.5.drug.v2;0.5.cisplatin;3.5fu;3.0.5.drug;").unwrap();
        assert_eq!(seq.events[0], Event::new(3.5, "drug.v2"));
        assert_eq!(seq.events[1], Event::new(0.5, "cisplatin"));
        assert_eq!(seq.events[2], Event::new(3.0, "5fu"));
        assert_eq!(seq.events[3], Event::new(3.0, "5.drug"));
    }

    #[test]
    fn test_format_then_parse_keeps_events() {
        let seq = Sequence::new(vec![
            Event::new(0.5, "b"),
            Event::new(1.25, "a"),
            Event::new(3.0, "5.drug"),
            Event::new(21.0, "cisplatin"),
            Event::new(0.0, "5fu"),
            Event::new(2.5, "7.x"),
            Event::new(4.0, "9."),
        ]);
        let text = format_record(&seq);
        assert_eq!(parse_record(&text).unwrap(), seq);
    }

    #[test]
    fn test_empty_record() {
        assert!(parse_record("").unwrap().is_empty());
        assert!(parse_record(";;").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_tokens() {
        let err = parse_record("0.a;cisplatin;").unwrap_err();
        assert!(err.to_string().contains("event 2"));
        assert!(matches!(parse_record("x.a"), Err(TswError::MalformedRecord(_))));
        assert!(matches!(parse_record("-1.a"), Err(TswError::MalformedRecord(_))));
        assert!(matches!(parse_record("1."), Err(TswError::MalformedRecord(_))));
        assert!(matches!(parse_record("1e3.a"), Err(TswError::MalformedRecord(_))));
    }

    #[test]
    fn test_format_record() {
        let seq = parse_record("0.a;14.b").unwrap();
        assert_eq!(format_record(&seq), "0.a;14.b;");
    }

    #[test]
    fn test_format_aligned() {
        let tokens = vec![
            AlignedToken::Event(Event::new(1.0, "a")),
            AlignedToken::Gap,
            AlignedToken::Event(Event::new(0.5, "b")),
        ];
        assert_eq!(format_aligned(&tokens), "1.a;__;0.5.b");
    }
}
