use std::path::Path;

use clap::ArgMatches;
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};

use crate::core::breadth::BreadthTable;
use crate::core::consensus::Consensus;
use crate::core::engine::{self, CoOccurrence};
use crate::core::io::sam;
use crate::core::metrics::CooccurMetric;
use crate::core::refbase::{GivenRef, ModalRef, RefBaseSource};
use crate::core::rindex::ReadIndex;

use super::{args, parse, resformat};

pub fn run(matches: &ArgMatches, factory: impl Fn() -> ProgressBar) {
    let input = parse::input(factory(), matches);
    let outdir = parse::output_dir(factory(), matches, &input);
    let positions = parse::positions(factory(), matches);
    let expected_reads = parse::expected_reads(factory(), matches);
    let window = parse::window(factory(), matches);
    let metric = parse::metric(factory(), matches);
    let reference = parse::reference(factory(), matches, positions);

    let pbar = factory();
    pbar.set_message(format!("Parsing alignment records from {}...", input.display()));
    let records = sam::parse(&input, expected_reads);
    let total = records.len();
    let index = ReadIndex::new(sam::reads(records), positions);
    pbar.finish_with_message(format!("Parsed {} aligned reads", total));

    let pbar = factory();
    pbar.set_message("Building the per-position consensus...");
    let consensus = Consensus::build(&index, window);
    let covered = (0..consensus.positions()).filter(|x| consensus.counts(*x).coverage() > 0).count();
    pbar.finish_with_message(format!("Consensus ready, {} of {} positions covered", covered, positions));

    match reference {
        Some(track) => _run(&index, &consensus, GivenRef::new(track), window, metric, &outdir, matches, factory),
        None => _run(&index, &consensus, ModalRef::new(), window, metric, &outdir, matches, factory),
    }
}

#[allow(clippy::too_many_arguments)]
fn _run<R: RefBaseSource>(
    index: &ReadIndex,
    consensus: &Consensus,
    refsource: R,
    window: usize,
    metric: CooccurMetric,
    outdir: &Path,
    matches: &ArgMatches,
    factory: impl Fn() -> ProgressBar,
) {
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:60.cyan/blue} {pos:>7}/{len:7} {msg}")
        .progress_chars("##-")
        .on_finish(ProgressFinish::AndLeave);

    let pbar = factory();
    pbar.set_style(style);
    pbar.set_length(index.positions() as u64);
    pbar.set_message("Scanning windowed position pairs...");
    let tables = engine::cooccurrence(index, consensus, &refsource, window, metric, || pbar.inc(1));
    pbar.finish_with_message(format!("Computed {} for every pair in range", metric));

    let pbar = factory();
    pbar.set_message("Counting pairwise read breadth...");
    let breadth = BreadthTable::build(index);
    pbar.finish_with_message("Pairwise read breadth ready");

    save(&tables, consensus, &breadth, window, metric, outdir, matches.is_present(args::CSV), factory);
}

#[allow(clippy::too_many_arguments)]
fn save(
    tables: &CoOccurrence,
    consensus: &Consensus,
    breadth: &BreadthTable,
    window: usize,
    metric: CooccurMetric,
    outdir: &Path,
    csv: bool,
    factory: impl Fn() -> ProgressBar,
) {
    let write = |filename: String, title: &str, action: &dyn Fn(&Path)| {
        let path = outdir.join(filename);
        let pbar = factory();
        pbar.set_message(format!("Writing {} to {}...", title, path.display()));
        action(&path);
        pbar.finish_with_message(format!("{} saved to {}", title, path.display()));
    };

    write(format!("{}.dat", metric.filestem()), "metric table", &|path| {
        resformat::metric_table(path, &tables.metric)
    });
    write("variantCounts.dat".into(), "contingency counts", &|path| {
        resformat::variant_counts(path, &tables.contingency)
    });
    write("baseCounts.dat".into(), "per-position base counts", &|path| {
        resformat::base_counts(path, consensus)
    });
    write("fullCounts.dat".into(), "base-pair counts", &|path| resformat::full_counts(path, tables));
    write("readBreadth.dat".into(), "pairwise read breadth", &|path| {
        resformat::read_breadth(path, breadth, window)
    });

    if csv {
        write(resformat::metric_csv_name(metric), "metric table (CSV)", &|path| {
            resformat::metric_csv(path, &tables.metric)
        });
        write("variantCounts.csv".into(), "contingency counts (CSV)", &|path| {
            resformat::variant_counts_csv(path, &tables.contingency)
        });
        write("baseCounts.csv".into(), "per-position base counts (CSV)", &|path| {
            resformat::base_counts_csv(path, consensus)
        });
    }
}
