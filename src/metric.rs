//! Pairwise connectivity metrics.
//!
//! The set is closed: two information-theoretic measures that need a
//! symbolic partition, and two correlation coefficients that need nothing.
//!
//! | name               | direction  | parameters          | range      |
//! |--------------------|------------|---------------------|------------|
//! | `transfer_entropy` | directed   | [`SymbolicParams`]  | `[0, ∞)`   |
//! | `mutual_info`      | undirected | [`SymbolicParams`]  | `[0, ∞)`   |
//! | `pearson`          | undirected | —                   | `[-1, 1]`  |
//! | `spearman`         | undirected | —                   | `[-1, 1]`  |
use std::fmt;
use std::str::FromStr;

use crate::error::{DfcError, Result};

/// Partition and embedding parameters for the symbolic estimators.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicParams {
    /// Ordered partition boundaries.  A sample maps to the number of
    /// boundaries `<=` it, giving `divs.len() + 1` symbols.
    ///
    /// Default: `[-0.5, -0.3, -0.1, 0.1, 0.3, 0.5]`.
    pub divs: Vec<f64>,

    /// Embedding delay (samples) between consecutive symbols of a word.
    ///
    /// Usually the first zero of the autocorrelation function.
    ///
    /// Default: `1`.
    pub tau: usize,

    /// Number of symbols per word.
    ///
    /// Default: `1`.
    pub symbolic_length: usize,
}

impl Default for SymbolicParams {
    fn default() -> Self {
        Self {
            divs: vec![-0.5, -0.3, -0.1, 0.1, 0.3, 0.5],
            tau: 1,
            symbolic_length: 1,
        }
    }
}

impl SymbolicParams {
    pub fn validate(&self) -> Result<()> {
        if self.divs.is_empty() {
            return Err(DfcError::config("divs must contain at least one boundary"));
        }
        if self.divs.iter().any(|d| !d.is_finite()) {
            return Err(DfcError::config("divs must be finite"));
        }
        if self.divs.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(DfcError::config("divs must be strictly increasing"));
        }
        if self.tau == 0 {
            return Err(DfcError::config("tau must be at least 1"));
        }
        if self.symbolic_length == 0 {
            return Err(DfcError::config("symbolic_length must be at least 1"));
        }
        if self.n_words().is_none() {
            return Err(DfcError::config(format!(
                "{} symbols with symbolic_length {} give more words than a usize can index",
                self.n_symbols(), self.symbolic_length
            )));
        }
        Ok(())
    }

    /// Size of the word alphabet, `n_symbols^symbolic_length`, or `None` on
    /// overflow.
    pub fn n_words(&self) -> Option<usize> {
        let exp = u32::try_from(self.symbolic_length).ok()?;
        self.n_symbols().checked_pow(exp)
    }

    /// Number of distinct symbols.
    #[inline]
    pub fn n_symbols(&self) -> usize {
        self.divs.len() + 1
    }

    /// Sample span of one word: `(symbolic_length - 1) · tau + 1`.
    #[inline]
    pub fn word_span(&self) -> usize {
        (self.symbolic_length - 1) * self.tau + 1
    }
}

/// Metric name without parameters, parsed from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    TransferEntropy,
    MutualInfo,
    Pearson,
    Spearman,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::TransferEntropy,
        MetricKind::MutualInfo,
        MetricKind::Pearson,
        MetricKind::Spearman,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricKind::TransferEntropy => "transfer_entropy",
            MetricKind::MutualInfo      => "mutual_info",
            MetricKind::Pearson         => "pearson",
            MetricKind::Spearman        => "spearman",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = DfcError;

    fn from_str(s: &str) -> Result<Self> {
        MetricKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| DfcError::config(format!(
                "unknown metric '{s}' (expected transfer_entropy, mutual_info, pearson or spearman)"
            )))
    }
}

/// A metric together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// Directed: `link(a, b)` is the information flow a → b.
    TransferEntropy(SymbolicParams),
    MutualInfo(SymbolicParams),
    Pearson,
    Spearman,
}

impl Default for Metric {
    fn default() -> Self {
        Metric::TransferEntropy(SymbolicParams::default())
    }
}

impl Metric {
    /// Select a metric by name.  `params` is ignored by the correlation
    /// metrics.
    pub fn from_name(name: &str, params: SymbolicParams) -> Result<Self> {
        Ok(Self::from_kind(name.parse()?, params))
    }

    pub fn from_kind(kind: MetricKind, params: SymbolicParams) -> Self {
        match kind {
            MetricKind::TransferEntropy => Metric::TransferEntropy(params),
            MetricKind::MutualInfo      => Metric::MutualInfo(params),
            MetricKind::Pearson         => Metric::Pearson,
            MetricKind::Spearman        => Metric::Spearman,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Metric::TransferEntropy(_) => MetricKind::TransferEntropy,
            Metric::MutualInfo(_)      => MetricKind::MutualInfo,
            Metric::Pearson            => MetricKind::Pearson,
            Metric::Spearman           => MetricKind::Spearman,
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Correlation metrics are signed and symmetric; thresholds apply to
    /// their magnitude.
    #[inline]
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Metric::Pearson | Metric::Spearman)
    }

    /// Symbolic parameters, if the metric uses them.
    pub fn symbolic_params(&self) -> Option<&SymbolicParams> {
        match self {
            Metric::TransferEntropy(p) | Metric::MutualInfo(p) => Some(p),
            Metric::Pearson | Metric::Spearman => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.symbolic_params() {
            Some(p) => p.validate(),
            None => Ok(()),
        }
    }

    /// Colour-bar caption used when the connectome is animated.
    pub fn colorbar_label(&self) -> &'static str {
        match self {
            Metric::TransferEntropy(_) => "Transfer entropy",
            Metric::MutualInfo(_)      => "Mutual information",
            Metric::Pearson            => "Pearson correlation",
            Metric::Spearman           => "Spearman correlation",
        }
    }
}
