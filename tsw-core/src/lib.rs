//! TSW Core Library
//!
//! Temporal Sequence Weighted alignment: local alignment of timestamped
//! categorical event sequences, scoring pairs by category similarity scaled
//! by how well their elapsed times agree.
//!
//! ```
//! use tsw_core::{align, AlignParams, SimilarityTable};
//! use tsw_core::record::parse_record;
//!
//! let template = parse_record("14.pemetrexed;14.pemetrexed;").unwrap();
//! let record = parse_record("0.cisplatin;0.pemetrexed;21.cisplatin;0.pemetrexed;").unwrap();
//! let table = SimilarityTable::with_defaults(["cisplatin", "pemetrexed"]).unwrap();
//!
//! let alignments = align(&template, &record, &table, &AlignParams::default()).unwrap();
//! assert!(!alignments.is_empty());
//! ```

pub mod error;
pub mod types;
pub mod similarity;
pub mod time_weight;
pub mod matrix;
pub mod score;
pub mod extract;
pub mod traceback;
pub mod align;
pub mod record;
pub mod report;

// Re-export commonly used types and functions
pub use error::{TswError, TswResult};
pub use types::{AlignedToken, Cell, Event, Sequence, Span, TimeEncoding, GAP_MARKER};
pub use similarity::{EncodedSequence, SimilarityTable};
pub use time_weight::{TimeWeight, TimeWeightMethod};
pub use matrix::{DpMatrix, ScoreMatrix, TraceCode, TraceMatrix};
pub use score::{ScoreMatrices, ScoreMatrixBuilder};
pub use extract::{BestScoreExtractor, ExclusionAxis, ExtractParams, Extraction, Hit, MaxAlignments};
pub use traceback::{reconstruct, trace_span, Traceback};
pub use align::{align, AlignParams, Alignment, AlignmentOutcome, TswAligner};
pub use report::{AlignmentRecord, ReportOptions};

/// Version information for the TSW core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
