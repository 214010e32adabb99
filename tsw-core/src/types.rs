use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::error::{TswError, TswResult};
use crate::record::label_reads_as_fraction;

/// Marker rendered in place of an event on the gapped side of an alignment
pub const GAP_MARKER: &str = "__";

/// A single timestamped categorical event, e.g. one drug administration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub label: String,
}

impl Event {
    pub fn new<S: Into<String>>(time: f64, label: S) -> Self {
        Self {
            time,
            label: label.into(),
        }
    }
}

impl fmt::Display for Event {
    /// Record form `<time>.<label>`. An integral time before a label that
    /// reads as a fraction (`5.drug`) is written as `3.0` so it parses back.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.time.fract() == 0.0 && label_reads_as_fraction(&self.label) {
            write!(f, "{:.1}.{}", self.time, self.label)
        } else {
            write!(f, "{}.{}", self.time, self.label)
        }
    }
}

/// How the `time` field of the events in a sequence is to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeEncoding {
    /// Each time is already the elapsed time since the previous event
    #[default]
    Elapsed,
    /// Times are absolute timestamps; deltas are taken between neighbours
    Absolute,
}

impl std::str::FromStr for TimeEncoding {
    type Err = TswError;

    fn from_str(s: &str) -> TswResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elapsed" => Ok(Self::Elapsed),
            "absolute" => Ok(Self::Absolute),
            other => Err(TswError::invalid_parameter(format!(
                "unknown time encoding '{}', expected 'elapsed' or 'absolute'",
                other
            ))),
        }
    }
}

/// Ordered list of events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub events: Vec<Event>,
}

impl Sequence {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    /// Elapsed-time delta at every position, rejecting non-finite or
    /// negative values
    pub fn time_deltas(&self, encoding: TimeEncoding) -> TswResult<Vec<f64>> {
        let mut deltas = Vec::with_capacity(self.events.len());
        let mut previous: Option<f64> = None;

        for (pos, event) in self.events.iter().enumerate() {
            if !event.time.is_finite() {
                return Err(TswError::invalid_score(format!(
                    "non-finite time {} at position {}",
                    event.time, pos
                )));
            }

            let delta = match encoding {
                TimeEncoding::Elapsed => event.time,
                TimeEncoding::Absolute => match previous {
                    Some(prev) => event.time - prev,
                    None => 0.0,
                },
            };

            if delta < 0.0 {
                return Err(TswError::invalid_score(format!(
                    "negative elapsed time {} at position {}",
                    delta, pos
                )));
            }

            previous = Some(event.time);
            deltas.push(delta);
        }

        Ok(deltas)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.label.as_str())
    }
}

impl From<Vec<Event>> for Sequence {
    fn from(events: Vec<Event>) -> Self {
        Self { events }
    }
}

impl FromIterator<Event> for Sequence {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

/// Half-open, zero-based range of sequence positions covered by an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// One-based inclusive bounds, the convention of tabular reports
    pub fn one_based(&self) -> (usize, usize) {
        (self.start + 1, self.end)
    }
}

/// Position in the score matrices: `row` indexes s2, `col` indexes s1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// One side of an alignment column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignedToken {
    Event(Event),
    Gap,
}

impl AlignedToken {
    pub fn is_gap(&self) -> bool {
        matches!(self, AlignedToken::Gap)
    }

    pub fn event(&self) -> Option<&Event> {
        match self {
            AlignedToken::Event(event) => Some(event),
            AlignedToken::Gap => None,
        }
    }
}

impl fmt::Display for AlignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignedToken::Event(event) => event.fmt(f),
            AlignedToken::Gap => f.write_str(GAP_MARKER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_deltas_pass_through() {
        let seq = Sequence::new(vec![Event::new(0.0, "a"), Event::new(21.0, "b")]);
        assert_eq!(seq.time_deltas(TimeEncoding::Elapsed).unwrap(), vec![0.0, 21.0]);
    }

    #[test]
    fn test_absolute_deltas() {
        let seq = Sequence::new(vec![
            Event::new(5.0, "a"),
            Event::new(7.0, "b"),
            Event::new(17.0, "c"),
        ]);
        assert_eq!(
            seq.time_deltas(TimeEncoding::Absolute).unwrap(),
            vec![0.0, 2.0, 10.0]
        );
    }

    #[test]
    fn test_decreasing_absolute_times_rejected() {
        let seq = Sequence::new(vec![Event::new(5.0, "a"), Event::new(3.0, "b")]);
        let err = seq.time_deltas(TimeEncoding::Absolute).unwrap_err();
        assert!(matches!(err, TswError::InvalidScoreInput(_)));
    }

    #[test]
    fn test_non_finite_time_rejected() {
        let seq = Sequence::new(vec![Event::new(f64::NAN, "a")]);
        assert!(seq.time_deltas(TimeEncoding::Elapsed).is_err());
    }

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 3);
        let b = Span::new(3, 5);
        let c = Span::new(2, 4);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
        assert_eq!(a.one_based(), (1, 3));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(AlignedToken::Event(Event::new(14.0, "pemetrexed")).to_string(), "14.pemetrexed");
        assert_eq!(AlignedToken::Gap.to_string(), "__");
    }
}
