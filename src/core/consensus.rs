use crate::core::dna::{NucCounts, ReqNucleotide};
use crate::core::rindex::{ReadIndex, SweepCursor};

// Per-position pileup summary: base counts, modal base and variant fraction.
// Built once per run in a single left-to-right sweep; immutable afterwards.
pub struct Consensus {
    counts: Vec<NucCounts>,
    modal: Vec<Option<ReqNucleotide>>,
    varfrac: Vec<f64>,
}

impl Consensus {
    pub fn build(index: &ReadIndex, window: usize) -> Self {
        let positions = index.positions();
        let mut counts = Vec::with_capacity(positions);
        let mut modal = Vec::with_capacity(positions);
        let mut varfrac = Vec::with_capacity(positions);

        let mut cursor = SweepCursor::new(index, window);
        for pos in 0..positions {
            let cnt = cursor.groups_at(pos).counts();
            modal.push(cnt.mostfreq().map(|x| x.0));
            varfrac.push(cnt.variant_fraction());
            counts.push(cnt);
        }

        Self { counts, modal, varfrac }
    }

    #[inline]
    pub fn positions(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn counts(&self, pos: usize) -> &NucCounts {
        &self.counts[pos]
    }

    #[inline]
    pub fn modal(&self, pos: usize) -> Option<ReqNucleotide> {
        self.modal[pos]
    }

    #[inline]
    pub fn variant_fraction(&self, pos: usize) -> f64 {
        self.varfrac[pos]
    }
}
