use clap::Arg;

use super::validate;

pub const INPUT: &str = "input";
pub const OUTPUT_DIR: &str = "output-dir";
pub const NUM_READS: &str = "num-reads";
pub const NUM_POSITIONS: &str = "num-positions";
pub const WINDOW: &str = "window";
pub const REFERENCE: &str = "reference";
pub const METRIC: &str = "metric";
pub const CSV: &str = "csv";

pub fn all<'a>() -> Vec<Arg<'a>> {
    vec![
        Arg::new(INPUT)
            .short('f')
            .long(INPUT)
            .takes_value(true)
            .required(true)
            .validator(validate::path)
            .long_help("Path to the alignment file to process: tab-separated SAM-like text, plain or gzipped."),
        Arg::new(OUTPUT_DIR)
            .short('d')
            .long(OUTPUT_DIR)
            .takes_value(true)
            .validator(validate::directory)
            .long_help("Directory to dump the output tables into. Defaults to the directory of the input file."),
        Arg::new(NUM_READS)
            .short('n')
            .long(NUM_READS)
            .takes_value(true)
            .required(true)
            .validator(validate::numeric(1usize, usize::MAX))
            .long_help(
                "The number of reads to expect (run `wc -l <FILE.sam>` to estimate). \
                 Used only to pre-size the read buffer.",
            ),
        Arg::new(NUM_POSITIONS)
            .short('p')
            .long(NUM_POSITIONS)
            .takes_value(true)
            .required(true)
            .validator(validate::numeric(1usize, u32::MAX as usize))
            .long_help(
                "The number of genomic positions to track. Reads or reference bases falling beyond \
                 this bound abort the run with a capacity error.",
            ),
        Arg::new(WINDOW)
            .short('w')
            .long(WINDOW)
            .takes_value(true)
            .default_value("300")
            .validator(validate::numeric(1usize, u32::MAX as usize))
            .long_help("The number of positions around every position to check for co-occurrence."),
        Arg::new(REFERENCE)
            .short('r')
            .long(REFERENCE)
            .takes_value(true)
            .validator(validate::path)
            .long_help(
                "Reference sequence file overriding the modal consensus. Lines starting with '>' are \
                 skipped; the rest is concatenated character by character.",
            ),
        Arg::new(METRIC)
            .short('m')
            .long(METRIC)
            .takes_value(true)
            .default_value("diff")
            .validator(validate::metric)
            .possible_values(["conj", "diff", "gated-diff", "outlier-diff", "ratio", "mutual-info"])
            .long_help("The co-occurrence metric to compute for every position pair."),
        Arg::new(CSV)
            .long(CSV)
            .takes_value(false)
            .long_help("Additionally dump the metric, contingency and base-count tables as CSV."),
    ]
}
