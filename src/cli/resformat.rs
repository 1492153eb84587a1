use std::cmp::min;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use itertools::Itertools;

use crate::core::breadth::BreadthTable;
use crate::core::consensus::Consensus;
use crate::core::engine::CoOccurrence;
use crate::core::io::binary;
use crate::core::matrix::WindowedMatrix;
use crate::core::metrics::{Contingency, CooccurMetric};

const IO_ERROR: &str = "Failed to write to the output file.";

fn create(path: &Path) -> BufWriter<File> {
    BufWriter::new(File::create(path).unwrap_or_else(|_| panic!("Failed to create {}", path.display())))
}

// in-window (i, j) pairs that actually fall inside [0, positions)
fn inrange(positions: usize, window: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..positions).flat_map(move |i| {
        (i.saturating_sub(window)..=min(i + window, positions - 1)).map(move |j| (i, j))
    })
}

pub fn metric_table(path: &Path, table: &WindowedMatrix<f64>) {
    let mut saveto = create(path);
    binary::write_dense_f32(&mut saveto, table.positions(), table.window(), |i, j| table.get(i, j) as f32)
        .expect(IO_ERROR);
    saveto.flush().expect(IO_ERROR);
}

pub fn variant_counts(path: &Path, contingency: &WindowedMatrix<Contingency>) {
    let mut saveto = create(path);
    let records = inrange(contingency.positions(), contingency.window()).filter_map(|(i, j)| {
        let cnt = contingency.get(i, j);
        (cnt.total() != 0).then(|| (contingency.abs_index(i, j), [cnt.mm, cnt.mv, cnt.vm, cnt.vv]))
    });
    binary::write_sparse_u32(&mut saveto, contingency.width(), contingency.positions(), records).expect(IO_ERROR);
    saveto.flush().expect(IO_ERROR);
}

pub fn base_counts(path: &Path, consensus: &Consensus) {
    let mut saveto = create(path);
    let records = (0..consensus.positions()).filter_map(|i| {
        let cnt = consensus.counts(i);
        (cnt.coverage() != 0).then(|| (i as u32, [cnt.A, cnt.T, cnt.C, cnt.G]))
    });
    binary::write_sparse_u32(&mut saveto, 1, consensus.positions(), records).expect(IO_ERROR);
    saveto.flush().expect(IO_ERROR);
}

pub fn full_counts(path: &Path, tables: &CoOccurrence) {
    let mut saveto = create(path);
    binary::write_pair_counts(&mut saveto, tables.contingency.width(), tables.contingency.positions(), &tables.pairs)
        .expect(IO_ERROR);
    saveto.flush().expect(IO_ERROR);
}

pub fn read_breadth(path: &Path, breadth: &BreadthTable, window: usize) {
    let mut saveto = create(path);
    binary::write_dense_f32(&mut saveto, breadth.positions(), window, |i, j| breadth.get(i, j) as f32)
        .expect(IO_ERROR);
    saveto.flush().expect(IO_ERROR);
}

// CSV twins of the binary tables, column layout matching the viewer's
// text imports: out-of-range cells print as 0.
pub fn metric_csv(path: &Path, table: &WindowedMatrix<f64>) {
    let mut saveto = create(path);
    for i in 0..table.positions() {
        writeln!(saveto, "{}", table.row(i).iter().join(",")).expect(IO_ERROR);
    }
    saveto.flush().expect(IO_ERROR);
}

pub fn variant_counts_csv(path: &Path, contingency: &WindowedMatrix<Contingency>) {
    let mut saveto = create(path);
    for (i, j) in inrange(contingency.positions(), contingency.window()) {
        let cnt = contingency.get(i, j);
        writeln!(saveto, "({},{}):{},{},{},{}", i, j, cnt.mm, cnt.mv, cnt.vm, cnt.vv).expect(IO_ERROR);
    }
    saveto.flush().expect(IO_ERROR);
}

pub fn base_counts_csv(path: &Path, consensus: &Consensus) {
    let mut saveto = create(path);
    for i in 0..consensus.positions() {
        let cnt = consensus.counts(i);
        writeln!(saveto, "{},{},{},{}", cnt.A, cnt.T, cnt.C, cnt.G).expect(IO_ERROR);
    }
    saveto.flush().expect(IO_ERROR);
}

// file stem of the CSV metric dump
pub fn metric_csv_name(metric: CooccurMetric) -> String {
    format!("{}.csv", metric.filestem())
}
