use crate::core::dna::{NucCounts, ReqNucleotide};
use crate::core::read::Read;

// All reads of the run, sorted by start position. The sort is what lets the
// downstream sweeps advance a monotone cursor instead of rescanning.
pub struct ReadIndex {
    reads: Vec<Read>,
    positions: usize,
}

impl ReadIndex {
    pub fn new(mut reads: Vec<Read>, positions: usize) -> Self {
        reads.sort_by_key(Read::start);

        if let Some(read) = reads.iter().find(|x| x.last_pos() >= positions) {
            panic!(
                "capacity exceeded: read spanning {}..={} does not fit into the configured {} positions, \
                 rerun with a larger --num-positions",
                read.start(),
                read.last_pos(),
                positions
            );
        }

        Self { reads, positions }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    #[inline]
    pub fn positions(&self) -> usize {
        self.positions
    }

    #[inline]
    pub fn reads(&self) -> &[Read] {
        &self.reads
    }

    #[inline]
    pub fn get(&self, id: u32) -> &Read {
        &self.reads[id as usize]
    }
}

// Read ids covering a pivot position, bucketed by their base there. Reads
// whose base at the pivot has no index (N and friends) are not bucketed.
#[derive(Default, Clone, Debug)]
pub struct BaseGroups {
    buckets: [Vec<u32>; 4],
}

impl BaseGroups {
    #[inline]
    pub fn bucket(&self, nuc: ReqNucleotide) -> &[u32] {
        &self.buckets[nuc.index()]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    pub fn counts(&self) -> NucCounts {
        NucCounts::new(
            self.buckets[0].len() as u32,
            self.buckets[1].len() as u32,
            self.buckets[2].len() as u32,
            self.buckets[3].len() as u32,
        )
    }

    fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    #[inline]
    fn push(&mut self, nuc: ReqNucleotide, id: u32) {
        self.buckets[nuc.index()].push(id);
    }
}

// Monotone sweep over the sorted index. Reads whose span plus the window
// ends before the pivot can never matter again, so the cursor skips them for
// every subsequent pivot; total work stays linear in read bases.
pub struct SweepCursor<'a> {
    index: &'a ReadIndex,
    window: usize,
    first: usize,
    groups: BaseGroups,
}

impl<'a> SweepCursor<'a> {
    pub fn new(index: &'a ReadIndex, window: usize) -> Self {
        Self { index, window, first: 0, groups: BaseGroups::default() }
    }

    // Pivots must be visited in non-decreasing order.
    pub fn groups_at(&mut self, pos: usize) -> &BaseGroups {
        self.groups.clear();

        for n in self.first..self.index.len() {
            let read = &self.index.reads()[n];
            if read.start() > pos {
                break;
            }
            if read.last_pos() + self.window < pos {
                self.first = n;
            }
            if read.last_pos() < pos {
                continue;
            }
            if let Ok(base) = ReqNucleotide::try_from(read.base_at(pos)) {
                self.groups.push(base, n as u32);
            }
        }

        &self.groups
    }
}
