use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use derive_getters::Dissolve;
use flate2::bufread::GzDecoder;

use crate::core::dna::Nucleotide;
use crate::core::read::Read;

// positional fields of a SAM-like data line; only these three are consumed
const RNAME: usize = 2;
const POS: usize = 3;
const SEQ: usize = 9;

#[derive(Eq, PartialEq, Debug, Dissolve)]
pub struct AlignmentRecord {
    pub rname: String,
    // 1-based leftmost position, as printed in the file
    pub pos: i64,
    pub seq: String,
}

fn _parse<T: BufRead>(mut reader: T, expected: usize) -> Vec<AlignmentRecord> {
    let mut records = Vec::with_capacity(expected);

    let mut buf = String::new();
    while reader.read_line(&mut buf).expect("Failed to read the alignment file") != 0 {
        let line = buf.trim_end();
        if line.is_empty() || line.starts_with('@') {
            buf.clear();
            continue;
        }

        let split: Vec<&str> = line.split('\t').collect();
        assert!(split.len() > SEQ, "truncated alignment line (expected at least {} fields): {}", SEQ + 1, line);

        let pos = split[POS]
            .parse()
            .unwrap_or_else(|_| panic!("malformed position field \"{}\" in alignment line: {}", split[POS], line));

        // "*" marks an unavailable sequence, treat it like an empty one
        let seq = split[SEQ];
        if seq.is_empty() || seq == "*" {
            buf.clear();
            continue;
        }

        records.push(AlignmentRecord { rname: split[RNAME].to_string(), pos, seq: seq.to_string() });
        buf.clear();
    }
    records
}

// expected is a capacity hint for the record buffer, nothing more
pub fn parse(path: impl AsRef<Path>, expected: usize) -> Vec<AlignmentRecord> {
    let path = path.as_ref();
    let file = File::open(path)
        .unwrap_or_else(|_| panic!("Failed to open the alignment file {}", path.display()));
    let file = BufReader::new(file);

    let gzipped = path.extension().and_then(OsStr::to_str) == Some("gz");
    if gzipped {
        _parse(BufReader::new(GzDecoder::new(file)), expected)
    } else {
        _parse(file, expected)
    }
}

pub fn reads(records: Vec<AlignmentRecord>) -> Vec<Read> {
    records
        .into_iter()
        .map(|record| {
            let (rname, pos, seq) = record.dissolve();
            Read::new(rname, seq.bytes().map(Nucleotide::from).collect(), pos)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use super::*;

    fn record(rname: &str, pos: i64, seq: &str) -> AlignmentRecord {
        AlignmentRecord { rname: rname.to_string(), pos, seq: seq.to_string() }
    }

    fn dataline(rname: &str, pos: &str, seq: &str) -> String {
        // QNAME FLAG RNAME POS MAPQ CIGAR RNEXT PNEXT TLEN SEQ QUAL
        format!("q0\t0\t{}\t{}\t60\t4M\t*\t0\t0\t{}\t IIII", rname, pos, seq)
    }

    #[test]
    fn empty() {
        assert!(_parse(BufReader::new("".as_bytes()), 0).is_empty());
    }

    #[test]
    fn headers_and_blanks_are_skipped() {
        let sam = format!(
            "@HD\tVN:1.6\tSO:coordinate\n\
             @SQ\tSN:ref\tLN:45\n\
             \n\
             {}\n",
            dataline("ref", "3", "ACGT")
        );
        assert_eq!(_parse(BufReader::new(sam.as_bytes()), 4), vec![record("ref", 3, "ACGT")]);
    }

    #[test]
    fn missing_sequences_are_skipped() {
        let sam = format!(
            "{}\n{}\n{}\n",
            dataline("ref", "1", "*"),
            dataline("ref", "2", "ACGT"),
            dataline("ref", "3", "")
        );
        assert_eq!(_parse(BufReader::new(sam.as_bytes()), 4), vec![record("ref", 2, "ACGT")]);
    }

    #[test]
    fn non_positive_positions_are_kept_for_clamping() {
        let sam = dataline("ref", "0", "ACGT");
        let records = _parse(BufReader::new(sam.as_bytes()), 4);
        assert_eq!(records, vec![record("ref", 0, "ACGT")]);

        // clamping happens at read construction
        let reads = reads(records);
        assert_eq!(reads[0].start(), 0);
    }

    #[test]
    #[should_panic(expected = "malformed position field")]
    fn malformed_position_aborts() {
        let sam = dataline("ref", "12x", "ACGT");
        _parse(BufReader::new(sam.as_bytes()), 4);
    }

    #[test]
    #[should_panic(expected = "truncated alignment line")]
    fn truncated_line_aborts() {
        _parse(BufReader::new("q0\t0\tref\t12\t60\n".as_bytes()), 1);
    }

    #[test]
    fn records_to_reads() {
        let reads = reads(vec![record("ref", 11, "ACgt")]);
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].start(), 10);
        assert_eq!(reads[0].len(), 4);
        assert_eq!(
            reads[0].sequence(),
            &[Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T]
        );
    }
}
