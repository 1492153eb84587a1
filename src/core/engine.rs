use std::cmp::min;
use std::collections::BTreeMap;

use crate::core::consensus::Consensus;
use crate::core::dna::ReqNucleotide;
use crate::core::matrix::WindowedMatrix;
use crate::core::metrics::{recenter_row, Contingency, CooccurMetric};
use crate::core::refbase::RefBaseSource;
use crate::core::rindex::{ReadIndex, SweepCursor};

// Sparse per-pair base co-occurrence counts, keyed by the (base_i, base_j)
// actually observed; absent keys mean a count of zero.
pub type PairBaseCounts = BTreeMap<(ReqNucleotide, ReqNucleotide), u32>;

pub struct CoOccurrence {
    pub contingency: WindowedMatrix<Contingency>,
    pub metric: WindowedMatrix<f64>,
    // (absolute index, counts) in ascending index order
    pub pairs: Vec<(u32, PairBaseCounts)>,
}

// The windowed pairwise sweep. For every pivot i with a usable reference
// base the covering reads are partitioned against it exactly once; the same
// partition is then replayed against every j inside the window.
pub fn cooccurrence<R: RefBaseSource>(
    index: &ReadIndex,
    consensus: &Consensus,
    refsource: &R,
    window: usize,
    metric: CooccurMetric,
    mut oneach: impl FnMut(),
) -> CoOccurrence {
    let positions = index.positions();
    let mut contingency = WindowedMatrix::new(positions, window);
    let mut metrics: WindowedMatrix<f64> = WindowedMatrix::new(positions, window);
    let mut pairs = Vec::new();

    let mut cursor = SweepCursor::new(index, window);
    for i in 0..positions {
        let groups = cursor.groups_at(i);

        let refi = match refsource.ref_at(i, consensus.counts(i)) {
            Some(x) => x,
            None => {
                oneach();
                continue;
            }
        };
        if groups.is_empty() {
            oneach();
            continue;
        }

        let hi = min(i + window, positions - 1);
        for j in i.saturating_sub(window)..=hi {
            let refj = match refsource.ref_at(j, consensus.counts(j)) {
                Some(x) => x,
                None => continue,
            };

            let mut cnt = Contingency::zeros();
            let mut paircnt = PairBaseCounts::new();

            for basei in ReqNucleotide::ALL {
                let modal_at_i = basei == refi;
                for &id in groups.bucket(basei) {
                    let read = index.get(id);
                    if !read.covers(j) {
                        continue;
                    }
                    // bases without an index cannot enter any table
                    let basej = match ReqNucleotide::try_from(read.base_at(j)) {
                        Ok(x) => x,
                        Err(_) => continue,
                    };

                    *paircnt.entry((basei, basej)).or_insert(0) += 1;
                    match (modal_at_i, basej == refj) {
                        (true, true) => cnt.mm += 1,
                        (true, false) => cnt.mv += 1,
                        (false, true) => cnt.vm += 1,
                        (false, false) => cnt.vv += 1,
                    }
                }
            }

            if !paircnt.is_empty() {
                pairs.push((contingency.abs_index(i, j), paircnt));
            }
            contingency.set(i, j, cnt);
            metrics.set(i, j, metric.evaluate(&cnt));
        }

        if metric.recenters_rows() {
            recenter_row(metrics.row_mut(i));
        }
        oneach();
    }

    CoOccurrence { contingency, metric: metrics, pairs }
}

#[cfg(test)]
mod tests {
    use crate::core::dna::{NucCounts, Nucleotide};
    use crate::core::read::Read;
    use crate::core::refbase::{GivenRef, MockRefBaseSource, ModalRef};

    use super::*;

    fn index(reads: &[(&str, i64)], positions: usize) -> ReadIndex {
        let reads = reads
            .iter()
            .map(|(seq, rawpos)| Read::new("ref".into(), seq.bytes().map(Nucleotide::from).collect(), *rawpos))
            .collect();
        ReadIndex::new(reads, positions)
    }

    fn run(reads: &[(&str, i64)], positions: usize, window: usize, metric: CooccurMetric) -> CoOccurrence {
        let index = index(reads, positions);
        let consensus = Consensus::build(&index, window);
        cooccurrence(&index, &consensus, &ModalRef::new(), window, metric, || {})
    }

    // three identical 40-base reads except for one substitution at offset 30
    // of the second read
    fn substitution_fixture() -> Vec<(&'static str, i64)> {
        let plain = "ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT";
        let mutated = "ACGTACGTACGTACGTACGTACGTACGTACTTACGTACGT";
        assert_eq!(plain.len(), 40);
        assert_eq!(plain.as_bytes()[30], b'G');
        assert_eq!(mutated.as_bytes()[30], b'T');
        vec![(plain, 1), (mutated, 1), (plain, 1)]
    }

    #[test]
    fn substitution_scenario() {
        let tables = run(&substitution_fixture(), 45, 30, CooccurMetric::DiffFromExpected);

        // all three reads agree at 0 and split 2:1 at 30
        assert_eq!(tables.contingency.get(0, 30), Contingency::new(2, 1, 0, 0));
        assert_eq!(tables.contingency.get(30, 0), Contingency::new(2, 0, 1, 0));

        // conditioned on the upstream position every read is modal, so the
        // difference collapses to -P(variant@30 | modal@0) = -1/3
        let value = tables.metric.get(0, 30);
        assert!((value - (-1.0 / 3.0)).abs() < 1e-12);
        // seen from the variant position the lone variant read is modal at 0
        assert_eq!(tables.metric.get(30, 0), 0.0);

        // the substitution shows up in the pair table with its real bases
        let abs = tables.contingency.abs_index(0, 30);
        let (_, paircnt) = tables.pairs.iter().find(|(index, _)| *index == abs).unwrap();
        assert_eq!(paircnt.get(&(ReqNucleotide::A, ReqNucleotide::G)), Some(&2));
        assert_eq!(paircnt.get(&(ReqNucleotide::A, ReqNucleotide::T)), Some(&1));
        assert_eq!(paircnt.len(), 2);
    }

    #[test]
    fn contingency_is_transpose_symmetric() {
        let tables = run(&substitution_fixture(), 45, 30, CooccurMetric::DiffFromExpected);
        let positions = tables.contingency.positions();
        let window = tables.contingency.window();

        for i in 0..positions {
            for j in i.saturating_sub(window)..=min(i + window, positions - 1) {
                assert_eq!(tables.contingency.get(i, j), tables.contingency.get(j, i).transpose(), "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn uncovered_positions_contribute_nothing() {
        // reads cover 0..=3 only; positions 4..=9 are empty
        let tables = run(&[("ACGT", 1), ("ACGT", 1)], 10, 4, CooccurMetric::DiffFromExpected);

        for i in 0..10usize {
            for j in i.saturating_sub(4)..=min(i + 4, 9) {
                if i > 3 || j > 3 {
                    assert_eq!(tables.contingency.get(i, j), Contingency::zeros(), "({}, {})", i, j);
                    assert_eq!(tables.metric.get(i, j), 0.0);
                }
            }
        }
        assert!(tables.pairs.iter().all(|(index, _)| {
            let (i, col) = (*index as usize / 9, *index as usize % 9);
            // j = i + col - window must land inside the covered 0..=3 span
            i <= 3 && (i + col) >= 4 && (i + col) - 4 <= 3
        }));
    }

    #[test]
    fn pairs_are_sparse_and_ordered() {
        let tables = run(&substitution_fixture(), 45, 30, CooccurMetric::DiffFromExpected);

        // strictly ascending absolute indices, no zero counts stored
        for pair in tables.pairs.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
        for (_, paircnt) in &tables.pairs {
            assert!(!paircnt.is_empty() && paircnt.len() <= 16);
            assert!(paircnt.values().all(|count| *count > 0));
        }
    }

    #[test]
    fn given_reference_flips_the_partition() {
        // both reads carry T at position 0, the supplied reference says A
        let index = index(&[("TC", 1), ("TC", 1)], 3);
        let consensus = Consensus::build(&index, 1);
        let track = vec![Nucleotide::A, Nucleotide::C, Nucleotide::C];
        let tables =
            cooccurrence(&index, &consensus, &GivenRef::new(track), 1, CooccurMetric::DiffFromExpected, || {});

        // every read is a variant at 0 and modal at 1
        assert_eq!(tables.contingency.get(0, 1), Contingency::new(0, 0, 2, 0));
        assert_eq!(tables.contingency.get(0, 0), Contingency::new(0, 0, 0, 2));
    }

    #[test]
    fn no_data_reference_skips_the_column() {
        let index = index(&[("ACG", 1), ("ACG", 1)], 3);
        let consensus = Consensus::build(&index, 2);

        // reference defined everywhere except position 1
        let mut refsource = MockRefBaseSource::new();
        refsource
            .expect_ref_at()
            .returning(|pos, sequenced: &NucCounts| if pos == 1 { None } else { sequenced.mostfreq().map(|x| x.0) });

        let tables = cooccurrence(&index, &consensus, &refsource, 2, CooccurMetric::DiffFromExpected, || {});

        for i in 0..3usize {
            for j in 0..3usize {
                let expected = if i == 1 || j == 1 { Contingency::zeros() } else { Contingency::new(2, 0, 0, 0) };
                assert_eq!(tables.contingency.get(i, j), expected, "({}, {})", i, j);
            }
        }
    }

    #[test]
    fn outlier_recentering() {
        let tables = run(&substitution_fixture(), 45, 30, CooccurMetric::OutlierDiffFromExpected);
        let plain = run(&substitution_fixture(), 45, 30, CooccurMetric::DiffFromExpected);

        // row 0 has exactly one nonzero cell (at j = 30, value -1/3), so its
        // mean equals that cell and the recentered value is 0... which makes
        // the whole row zero
        let row = tables.metric.row(0);
        assert!(row.iter().all(|x| *x == 0.0));

        // row 30 has many nonzero cells; check one against the hand-derived
        // recentering of the plain difference
        let raw: Vec<f64> = plain.metric.row(30).to_vec();
        let nonzero: Vec<f64> = raw.iter().copied().filter(|x| *x != 0.0).collect();
        assert!(!nonzero.is_empty());
        let mean = nonzero.iter().sum::<f64>() / nonzero.len() as f64;

        for (expected_raw, recentered) in raw.iter().zip(tables.metric.row(30)) {
            if *expected_raw == 0.0 {
                assert_eq!(*recentered, 0.0);
            } else {
                assert!((recentered - (mean - expected_raw)).abs() < 1e-12);
            }
        }
    }
}
