use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_more::{Add, AddAssign, Constructor};

// 2x2 contingency for a position pair (i, j): reads spanning both, split by
// agreement with the reference base at each end. First letter is the i side.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Default, Add, AddAssign, Constructor)]
pub struct Contingency {
    pub mm: u32,
    pub mv: u32,
    pub vm: u32,
    pub vv: u32,
}

impl Contingency {
    #[inline]
    pub fn zeros() -> Self {
        Self::default()
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.mm + self.mv + self.vm + self.vv
    }

    // row sums: agreement with the reference at i
    #[inline]
    pub fn variant_i(&self) -> u32 {
        self.vm + self.vv
    }

    #[inline]
    pub fn modal_i(&self) -> u32 {
        self.mm + self.mv
    }

    // column sums: agreement with the reference at j
    #[inline]
    pub fn variant_j(&self) -> u32 {
        self.mv + self.vv
    }

    #[inline]
    pub fn modal_j(&self) -> u32 {
        self.mm + self.vm
    }

    // the same pair seen from (j, i)
    #[inline]
    pub fn transpose(&self) -> Self {
        Self { mm: self.mm, mv: self.vm, vm: self.mv, vv: self.vv }
    }
}

// Scalar summaries of a contingency. Exactly one strategy is active per run;
// every zero denominator resolves to a neutral 0, never to a fault or NaN.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum CooccurMetric {
    ConjProb,
    DiffFromExpected,
    GatedDiffFromExpected,
    OutlierDiffFromExpected,
    RatioOfObservedToExpected,
    MutualInformation,
}

// positions whose variant share at i falls below this gate are zeroed out
const GATE_MIN_VARIANT_FREQ: f64 = 0.05;
// bounds of the log odds ratio
const RATIO_CLAMP: f64 = 5.0;

impl CooccurMetric {
    pub fn evaluate(&self, cnt: &Contingency) -> f64 {
        match self {
            // the outlier flavor starts from the plain difference and is
            // recentered row by row afterwards
            CooccurMetric::DiffFromExpected | CooccurMetric::OutlierDiffFromExpected => diff_from_expected(cnt),
            CooccurMetric::GatedDiffFromExpected => gated_diff_from_expected(cnt),
            CooccurMetric::ConjProb => conj_prob(cnt),
            CooccurMetric::RatioOfObservedToExpected => ratio_of_observed_to_expected(cnt),
            // declared but not computed; kept so runs selecting it stay valid
            CooccurMetric::MutualInformation => 0.0,
        }
    }

    // whether the per-row recentering pass applies
    #[inline]
    pub fn recenters_rows(&self) -> bool {
        matches!(self, CooccurMetric::OutlierDiffFromExpected)
    }

    // stem of the emitted table file, matching what the viewer expects
    pub fn filestem(&self) -> &'static str {
        match self {
            CooccurMetric::ConjProb => "conjProb",
            CooccurMetric::DiffFromExpected => "conjProbDiff",
            CooccurMetric::GatedDiffFromExpected => "conjProbDiff-gated05",
            CooccurMetric::OutlierDiffFromExpected => "conjProbDiff-outliers",
            CooccurMetric::RatioOfObservedToExpected => "conjProbDiff-ratio",
            CooccurMetric::MutualInformation => "mutualInfo",
        }
    }
}

impl FromStr for CooccurMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conj" => Ok(CooccurMetric::ConjProb),
            "diff" => Ok(CooccurMetric::DiffFromExpected),
            "gated-diff" => Ok(CooccurMetric::GatedDiffFromExpected),
            "outlier-diff" => Ok(CooccurMetric::OutlierDiffFromExpected),
            "ratio" => Ok(CooccurMetric::RatioOfObservedToExpected),
            "mutual-info" => Ok(CooccurMetric::MutualInformation),
            _ => Err(format!(
                "unknown metric {}, expected one of conj, diff, gated-diff, outlier-diff, ratio, mutual-info",
                s
            )),
        }
    }
}

impl Display for CooccurMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CooccurMetric::ConjProb => "CONJ_PROB",
            CooccurMetric::DiffFromExpected => "DIFF_FROM_EXPECTED",
            CooccurMetric::GatedDiffFromExpected => "GATED_DIFF_FROM_EXPECTED",
            CooccurMetric::OutlierDiffFromExpected => "OUTLIER_DIFF_FROM_EXPECTED",
            CooccurMetric::RatioOfObservedToExpected => "RATIO_OF_OBSERVED_TO_EXPECTED",
            CooccurMetric::MutualInformation => "MUTUAL_INFORMATION",
        };
        write!(f, "{}", name)
    }
}

// P(variant@j | variant@i) - P(variant@j | modal@i), in [-1, 1]
fn diff_from_expected(cnt: &Contingency) -> f64 {
    let vari = cnt.variant_i();
    let modali = cnt.modal_i();

    let p_varj_given_vari = if vari == 0 { 0.0 } else { f64::from(cnt.vv) / f64::from(vari) };
    let p_varj_given_modali = if modali == 0 { 0.0 } else { f64::from(cnt.mv) / f64::from(modali) };

    p_varj_given_vari - p_varj_given_modali
}

fn gated_diff_from_expected(cnt: &Contingency) -> f64 {
    let total = cnt.total();
    if total == 0 || f64::from(cnt.variant_i()) / f64::from(total) < GATE_MIN_VARIANT_FREQ {
        return 0.0;
    }
    diff_from_expected(cnt)
}

// P(variant@i & variant@j) / P(variant@i)
fn conj_prob(cnt: &Contingency) -> f64 {
    let vari = cnt.variant_i();
    if vari == 0 {
        0.0
    } else {
        f64::from(cnt.vv) / f64::from(vari)
    }
}

// ln(P(vv) / (P(variant@i) * P(variant@j))), clamped to [-5, 5]; the clamp
// also absorbs the -inf of an observed joint count of zero
fn ratio_of_observed_to_expected(cnt: &Contingency) -> f64 {
    let total = cnt.total();
    if total == 0 {
        return 0.0;
    }

    let p_joint = f64::from(cnt.vv) / f64::from(total);
    let p_vari = f64::from(cnt.variant_i()) / f64::from(total);
    let p_varj = f64::from(cnt.variant_j()) / f64::from(total);

    if p_vari * p_varj <= 0.0 {
        0.0
    } else {
        (p_joint / (p_vari * p_varj)).ln().clamp(-RATIO_CLAMP, RATIO_CLAMP)
    }
}

// Second pass of the outlier flavor: replace every nonzero cell with
// (row mean - cell), the mean taken over the nonzero cells only. A row with
// no nonzero cell has no meaningful mean and is left untouched.
pub fn recenter_row(row: &mut [f64]) {
    let (mut sum, mut nonzero) = (0.0, 0u32);
    for value in row.iter() {
        if *value != 0.0 {
            sum += *value;
            nonzero += 1;
        }
    }
    if nonzero == 0 {
        return;
    }

    let mean = sum / f64::from(nonzero);
    for value in row.iter_mut() {
        if *value != 0.0 {
            *value = mean - *value;
        }
    }
}
