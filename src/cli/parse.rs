use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ArgMatches;
use indicatif::ProgressBar;

use crate::core::dna::Nucleotide;
use crate::core::io::fasta;
use crate::core::metrics::CooccurMetric;

use super::args;

pub fn input(pbar: ProgressBar, matches: &ArgMatches) -> PathBuf {
    pbar.set_message("Parsing path to the input alignment file...");
    let result: PathBuf = matches.value_of(args::INPUT).unwrap().into();
    pbar.finish_with_message(format!("Input alignment file: {}", result.display()));
    result
}

pub fn output_dir(pbar: ProgressBar, matches: &ArgMatches, input: &Path) -> PathBuf {
    pbar.set_message("Parsing the output directory...");
    let result: PathBuf = match matches.value_of(args::OUTPUT_DIR) {
        Some(x) => x.into(),
        // fall back to wherever the input file lives
        None => input.parent().filter(|x| !x.as_os_str().is_empty()).unwrap_or_else(|| Path::new(".")).into(),
    };
    pbar.finish_with_message(format!("Output tables will be saved to {}", result.display()));
    result
}

pub fn expected_reads(pbar: ProgressBar, matches: &ArgMatches) -> usize {
    pbar.set_message("Parsing the expected number of reads...");
    let result = matches.value_of(args::NUM_READS).and_then(|x| x.parse().ok()).unwrap();
    pbar.finish_with_message(format!("Pre-sizing buffers for {} reads", result));
    result
}

pub fn positions(pbar: ProgressBar, matches: &ArgMatches) -> usize {
    pbar.set_message("Parsing the expected number of positions...");
    let result = matches.value_of(args::NUM_POSITIONS).and_then(|x| x.parse().ok()).unwrap();
    pbar.finish_with_message(format!("Tracking {} genomic positions", result));
    result
}

pub fn window(pbar: ProgressBar, matches: &ArgMatches) -> usize {
    pbar.set_message("Parsing the window size...");
    let result = matches.value_of(args::WINDOW).and_then(|x| x.parse().ok()).unwrap();
    pbar.finish_with_message(format!("Tracking co-occurrence inside a +/-{} window", result));
    result
}

pub fn metric(pbar: ProgressBar, matches: &ArgMatches) -> CooccurMetric {
    pbar.set_message("Parsing the requested metric...");
    let result = CooccurMetric::from_str(matches.value_of(args::METRIC).unwrap()).unwrap();
    pbar.finish_with_message(format!("Co-occurrence metric: {}", result));
    result
}

pub fn reference(pbar: ProgressBar, matches: &ArgMatches, positions: usize) -> Option<Vec<Nucleotide>> {
    pbar.set_message("Parsing the reference sequence...");
    match matches.value_of(args::REFERENCE) {
        None => {
            pbar.finish_with_message("No reference file given, falling back to the modal consensus");
            None
        }
        Some(path) => {
            let track = fasta::parse(path, positions);
            let known = track.iter().filter(|x| **x != Nucleotide::Unknown).count();
            pbar.finish_with_message(format!("Parsed {} reference bases from {}", known, path));
            Some(track)
        }
    }
}
