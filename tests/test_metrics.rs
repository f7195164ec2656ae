mod common;
use approx::assert_abs_diff_eq;
use common::driven_pair;
use dfc::estimators::{mutual_info, symbolize, transfer_entropy};
use dfc::{assemble, link, DfcConfig, DfcError, EstimatorError, Metric, MetricKind, SymbolicParams};

fn entropy_bits(symbols: &[usize]) -> f64 {
    let k = symbols.iter().max().map_or(0, |m| m + 1);
    let mut hist = vec![0usize; k];
    for &s in symbols {
        hist[s] += 1;
    }
    let n = symbols.len() as f64;
    hist.iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum()
}

#[test]
fn te_detects_direction_of_drive() {
    // Channel 1 repeats channel 0 one sample later.
    let rec = driven_pair(2000, 1, 11);
    let cfg = DfcConfig {
        window_length: 1000,
        metric: Metric::TransferEntropy(SymbolicParams::default()),
        ..DfcConfig::default()
    };
    let conn = assemble(&rec, &cfg, None).unwrap();
    assert_eq!(conn.n_windows(), 1);
    let te01 = conn.dfc[[0, 0, 1]];
    let te10 = conn.dfc[[0, 1, 0]];
    assert!(te01 > 1.5, "drive direction too weak: {te01:.3}");
    assert!(te10 < 0.6, "reverse direction too strong: {te10:.3}");
}

#[test]
fn mi_of_signal_with_itself_is_its_entropy() {
    let rec = driven_pair(1000, 1, 5);
    let x = rec.data().row(0).to_vec();
    let p = SymbolicParams::default();
    let h = entropy_bits(&symbolize(&x, &p.divs));
    assert_abs_diff_eq!(mutual_info(&x, &x, &p).unwrap(), h, epsilon = 1e-9);
}

#[test]
fn te_is_not_symmetric_but_mi_is() {
    let rec = driven_pair(1500, 1, 21);
    let x = rec.data().row(0).to_vec();
    let y = rec.data().row(1).to_vec();
    let p = SymbolicParams::default();
    let xy = transfer_entropy(&x, &y, &p).unwrap();
    let yx = transfer_entropy(&y, &x, &p).unwrap();
    assert!(xy > yx + 1.0);
    assert_abs_diff_eq!(
        mutual_info(&x, &y, &p).unwrap(),
        mutual_info(&y, &x, &p).unwrap(),
        epsilon = 1e-12
    );
}

#[test]
fn longer_words_use_more_history() {
    let rec = driven_pair(1200, 2, 3);
    let x = rec.data().row(0).to_vec();
    let y = rec.data().row(1).to_vec();
    // With L = 1 the future of y is two steps past the last x symbol seen;
    // L = 2, τ = 1 brings the driving sample into the word.
    let short = SymbolicParams { divs: vec![0.0], ..SymbolicParams::default() };
    let long = SymbolicParams { divs: vec![0.0], symbolic_length: 2, ..SymbolicParams::default() };
    let te_short = transfer_entropy(&x, &y, &short).unwrap();
    let te_long = transfer_entropy(&x, &y, &long).unwrap();
    assert!(te_long > te_short + 0.5, "L=2: {te_long:.3}, L=1: {te_short:.3}");
}

#[test]
fn delay_aligns_lagged_copy() {
    let rec = driven_pair(400, 3, 9);
    let a = rec.data().row(0);
    let b = rec.data().row(1);
    let r0 = link::evaluate(a, b, &Metric::Pearson, 0).unwrap();
    let r3 = link::evaluate(a, b, &Metric::Pearson, 3).unwrap();
    assert!(r0.abs() < 0.3, "unaligned r = {r0:.3}");
    assert_abs_diff_eq!(r3, 1.0, epsilon = 1e-12);
    // Negative delay pairs a[k + 3] with b[k], which is unrelated.
    let rneg = link::evaluate(a, b, &Metric::Pearson, -3).unwrap();
    assert!(rneg.abs() < 0.3);
}

#[test]
fn estimator_failure_surfaces_as_error() {
    let a = ndarray::Array1::<f64>::zeros(50);
    let b = ndarray::Array1::<f64>::linspace(0.0, 1.0, 50);
    let err = link::evaluate(a.view(), b.view(), &Metric::Spearman, 0).unwrap_err();
    assert!(matches!(err, DfcError::Estimator(EstimatorError::ZeroVariance)));
}

#[test]
fn metric_names_round_trip() {
    for kind in MetricKind::ALL {
        let parsed: MetricKind = kind.name().parse().unwrap();
        assert_eq!(parsed, kind);
    }
    let err = Metric::from_name("granger", SymbolicParams::default()).unwrap_err();
    assert!(matches!(err, DfcError::InvalidConfiguration(_)));
}
