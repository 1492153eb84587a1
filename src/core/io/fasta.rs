use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::dna::Nucleotide;

// Reference sequence, one character per position index. Lines starting with
// '>' are headers; everything else is trimmed and concatenated. Positions
// the file does not reach keep the no-data sentinel.
fn _parse<T: BufRead>(mut reader: T, positions: usize) -> Vec<Nucleotide> {
    let mut track = vec![Nucleotide::Unknown; positions];
    let mut counter = 0usize;

    let mut buf = String::new();
    while reader.read_line(&mut buf).expect("Failed to read the reference file") != 0 {
        let line = buf.trim();
        if line.is_empty() || line.starts_with('>') {
            buf.clear();
            continue;
        }

        for symbol in line.bytes() {
            assert!(
                counter < positions,
                "capacity exceeded: the reference sequence is longer than the configured {} positions, \
                 rerun with a larger --num-positions",
                positions
            );
            track[counter] = Nucleotide::from(symbol);
            counter += 1;
        }
        buf.clear();
    }

    track
}

pub fn parse(path: impl AsRef<Path>, positions: usize) -> Vec<Nucleotide> {
    let path = path.as_ref();
    let file = File::open(path)
        .unwrap_or_else(|_| panic!("Failed to open the reference file {}", path.display()));
    _parse(BufReader::new(file), positions)
}

#[cfg(test)]
mod tests {
    use std::io::BufReader;

    use super::*;

    #[test]
    fn headers_and_whitespace() {
        let fasta = ">chr virus assembly\n  ACGT \nNA\n\n>ignored\ncg\n";
        let track = _parse(BufReader::new(fasta.as_bytes()), 10);

        use Nucleotide::*;
        assert_eq!(track, vec![A, C, G, T, Unknown, A, C, G, Unknown, Unknown]);
    }

    #[test]
    fn tail_keeps_the_sentinel() {
        let track = _parse(BufReader::new(">x\nAC\n".as_bytes()), 5);
        assert_eq!(&track[2..], &[Nucleotide::Unknown; 3]);
    }

    #[test]
    #[should_panic(expected = "capacity exceeded")]
    fn overlong_reference_aborts() {
        _parse(BufReader::new("ACGTACGT\n".as_bytes()), 4);
    }
}
