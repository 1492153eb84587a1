use derive_more::Constructor;
#[cfg(test)]
use mockall::automock;

use crate::core::dna::{NucCounts, Nucleotide, ReqNucleotide};

// The "expected" base the engine partitions reads against. None is the
// no-data sentinel: an uncovered position without an external reference, or
// a reference track that ends (or carries an unmappable character) there.
#[cfg_attr(test, automock)]
pub trait RefBaseSource {
    fn ref_at(&self, pos: usize, sequenced: &NucCounts) -> Option<ReqNucleotide>;
}

// Fall back to the modal consensus when no reference file is supplied.
#[derive(Constructor, Copy, Clone)]
pub struct ModalRef;

impl RefBaseSource for ModalRef {
    fn ref_at(&self, _: usize, sequenced: &NucCounts) -> Option<ReqNucleotide> {
        sequenced.mostfreq().map(|x| x.0)
    }
}

// An externally supplied reference sequence overrides the modal base
// everywhere, including positions it does not reach (those stay no-data).
#[derive(Constructor, Clone)]
pub struct GivenRef {
    track: Vec<Nucleotide>,
}

impl RefBaseSource for GivenRef {
    fn ref_at(&self, pos: usize, _: &NucCounts) -> Option<ReqNucleotide> {
        self.track.get(pos).copied().and_then(|x| ReqNucleotide::try_from(x).ok())
    }
}
