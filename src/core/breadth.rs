use crate::core::rindex::ReadIndex;

// Dense symmetric pair coverage: how many reads span both i and j. Only a
// diagnostic/denominator table, independent of the selected metric.
pub struct BreadthTable {
    positions: usize,
    data: Vec<u32>,
}

impl BreadthTable {
    pub fn build(index: &ReadIndex) -> Self {
        let positions = index.positions();
        let mut data = vec![0u32; positions * positions];

        for read in index.reads() {
            for k in read.start()..=read.last_pos() {
                for n in read.start()..=read.last_pos() {
                    data[k * positions + n] += 1;
                }
            }
        }

        Self { positions, data }
    }

    #[inline]
    pub fn positions(&self) -> usize {
        self.positions
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> u32 {
        self.data[i * self.positions + j]
    }
}

#[cfg(test)]
mod tests {
    use crate::core::dna::Nucleotide;
    use crate::core::read::Read;

    use super::*;

    fn build(reads: &[(&str, i64)], positions: usize) -> BreadthTable {
        let reads = reads
            .iter()
            .map(|(seq, rawpos)| Read::new("ref".into(), seq.bytes().map(Nucleotide::from).collect(), *rawpos))
            .collect();
        BreadthTable::build(&ReadIndex::new(reads, positions))
    }

    #[test]
    fn pair_counts() {
        // pos:     012345
        // r0:      AAAA
        // r1:        AAAA
        let dummy = build(&[("AAAA", 1), ("AAAA", 3)], 6);

        // diagonal equals plain depth
        assert_eq!(dummy.get(0, 0), 1);
        assert_eq!(dummy.get(2, 2), 2);
        assert_eq!(dummy.get(5, 5), 1);

        // pairs inside a single read
        assert_eq!(dummy.get(0, 3), 1);
        assert_eq!(dummy.get(2, 3), 2);
        assert_eq!(dummy.get(2, 5), 1);

        // nothing spans from the head of r0 to the tail of r1
        assert_eq!(dummy.get(0, 4), 0);
        assert_eq!(dummy.get(1, 5), 0);
    }

    #[test]
    fn symmetric() {
        let dummy = build(&[("ACGTAC", 1), ("GGGG", 4), ("TT", 9)], 11);
        for i in 0..dummy.positions() {
            for j in 0..dummy.positions() {
                assert_eq!(dummy.get(i, j), dummy.get(j, i), "({}, {})", i, j);
            }
        }
    }
}
