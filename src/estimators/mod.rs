//! Pairwise dependency estimators.
//!
//! Pure functions with one contract: two equal-length sample slices in, one
//! scalar out, or an [`EstimatorError`](crate::error::EstimatorError) when
//! the segment cannot support an estimate.
//!
//! - [`symbolic`]: plug-in transfer entropy and mutual information over a
//!   partition-based symbolisation (bits).
//! - [`correlation`]: Pearson and Spearman coefficients.

pub mod correlation;
pub mod symbolic;

pub use correlation::{pearson, rank_average, spearman};
pub use symbolic::{mutual_info, symbolize, transfer_entropy, words};

use crate::error::EstimatorError;

pub(crate) fn check_pair(x: &[f64], y: &[f64]) -> Result<(), EstimatorError> {
    if x.len() != y.len() {
        return Err(EstimatorError::LengthMismatch(x.len(), y.len()));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(EstimatorError::NonFinite);
    }
    Ok(())
}
