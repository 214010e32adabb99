//! Score matrix fill
//!
//! Local-alignment recurrence with two independent gap accumulators:
//!
//! ```text
//! w        = weight(dt_s1(i), dt_s2(j), T)
//! diag     = H[j-1][i-1] + sim(s1[i], s2[j]) * w
//! TC[j][i] = max(H[j][i-1] - g, TC[j][i-1] - g)     // consumes only s1
//! TR[j][i] = max(H[j-1][i] - g, TR[j-1][i] - g)     // consumes only s2
//! H[j][i]  = max(0, diag, TC[j][i], TR[j][i])
//! ```
//!
//! Ties resolve `Diag > Left (TC) > Up (TR)`; a cell whose maximum is not
//! positive is stored as `0` with trace `None`.

use crate::error::{TswError, TswResult};
use crate::matrix::{DpMatrix, ScoreMatrix, TraceCode, TraceMatrix};
use crate::similarity::{EncodedSequence, SimilarityTable};
use crate::time_weight::{AbsDiff, PropDiff, TimeWeight, TimeWeightMethod, Uniform};

/// Filled matrices of one alignment request
#[derive(Debug, Clone)]
pub struct ScoreMatrices {
    pub h: ScoreMatrix,
    pub tr: ScoreMatrix,
    pub tc: ScoreMatrix,
    pub trace: TraceMatrix,
}

impl ScoreMatrices {
    /// Length of s1 (columns minus the boundary)
    pub fn s1_len(&self) -> usize {
        self.h.cols() - 1
    }

    /// Length of s2 (rows minus the boundary)
    pub fn s2_len(&self) -> usize {
        self.h.rows() - 1
    }
}

/// Fills H, TR, TC and the trace matrix for a pair of encoded sequences
#[derive(Debug, Clone)]
pub struct ScoreMatrixBuilder<'a> {
    table: &'a SimilarityTable,
    gap_penalty: f64,
    time_param: f64,
}

impl<'a> ScoreMatrixBuilder<'a> {
    pub fn new(table: &'a SimilarityTable, gap_penalty: f64, time_param: f64) -> TswResult<Self> {
        if !gap_penalty.is_finite() || gap_penalty < 0.0 {
            return Err(TswError::invalid_parameter(format!(
                "gap penalty must be a finite value >= 0, got {}",
                gap_penalty
            )));
        }
        if !time_param.is_finite() {
            return Err(TswError::invalid_parameter(format!(
                "time-penalty parameter must be finite, got {}",
                time_param
            )));
        }

        Ok(Self {
            table,
            gap_penalty,
            time_param,
        })
    }

    /// Resolve `method` to its strategy and fill
    pub fn build(
        &self,
        s1: &EncodedSequence,
        s2: &EncodedSequence,
        method: TimeWeightMethod,
    ) -> TswResult<ScoreMatrices> {
        match method {
            TimeWeightMethod::PropDiff => self.fill(s1, s2, &PropDiff),
            TimeWeightMethod::AbsDiff => self.fill(s1, s2, &AbsDiff),
            TimeWeightMethod::Uniform => self.fill(s1, s2, &Uniform),
        }
    }

    /// Fill all four matrices row by row
    pub fn fill<W: TimeWeight>(
        &self,
        s1: &EncodedSequence,
        s2: &EncodedSequence,
        weight: &W,
    ) -> TswResult<ScoreMatrices> {
        self.validate(s1, "s1")?;
        self.validate(s2, "s2")?;

        let m = s1.len();
        let n = s2.len();
        let rows = n + 1;
        let cols = m + 1;
        let g = self.gap_penalty;
        let t = self.time_param;

        log::debug!(
            "Filling {}x{} score matrices (g={}, T={}, method={})",
            rows,
            cols,
            g,
            t,
            weight.name()
        );

        let mut h: ScoreMatrix = DpMatrix::new(rows, cols);
        let mut tr: ScoreMatrix = DpMatrix::new(rows, cols);
        let mut tc: ScoreMatrix = DpMatrix::new(rows, cols);
        let mut trace = TraceMatrix::new(rows, cols);

        {
            let hs = h.as_mut_slice();
            let trs = tr.as_mut_slice();
            let tcs = tc.as_mut_slice();

            for j in 1..rows {
                let label2 = s2.labels[j - 1];
                let dt2 = s2.deltas[j - 1];
                let row = j * cols;
                let up_row = row - cols;

                for i in 1..cols {
                    let idx = row + i;
                    let up = up_row + i;

                    let w = weight.weight(s1.deltas[i - 1], dt2, t);
                    let diag = hs[up - 1] + self.table.score(s1.labels[i - 1], label2) * w;
                    let left = (hs[idx - 1] - g).max(tcs[idx - 1] - g);
                    let vertical = (hs[up] - g).max(trs[up] - g);

                    tcs[idx] = left;
                    trs[idx] = vertical;

                    let (best, code) = select(diag, left, vertical);
                    hs[idx] = best;
                    trace.set(j, i, code);
                }
            }
        }

        Ok(ScoreMatrices { h, tr, tc, trace })
    }

    fn validate(&self, seq: &EncodedSequence, name: &str) -> TswResult<()> {
        if seq.deltas.len() != seq.labels.len() {
            return Err(TswError::invalid_parameter(format!(
                "{} has {} times but {} labels",
                name,
                seq.deltas.len(),
                seq.labels.len()
            )));
        }
        if let Some(pos) = seq.labels.iter().position(|&l| l >= self.table.len()) {
            return Err(TswError::missing_label(format!(
                "#{} ({} position {})",
                seq.labels[pos], name, pos
            )));
        }
        if let Some(pos) = seq.deltas.iter().position(|d| !d.is_finite() || *d < 0.0) {
            return Err(TswError::invalid_score(format!(
                "{} has invalid elapsed time {} at position {}",
                name, seq.deltas[pos], pos
            )));
        }
        Ok(())
    }
}

/// Pick the cell value and its source, honouring `Diag > Left > Up > None`
#[inline]
fn select(diag: f64, left: f64, vertical: f64) -> (f64, TraceCode) {
    let mut best = diag;
    let mut code = TraceCode::Diag;
    if left > best {
        best = left;
        code = TraceCode::Left;
    }
    if vertical > best {
        best = vertical;
        code = TraceCode::Up;
    }
    if best > 0.0 {
        (best, code)
    } else {
        (0.0, TraceCode::None)
    }
}
