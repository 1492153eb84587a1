use clap::{crate_name, crate_version, App, AppSettings};
use indicatif::{ProgressBar, ProgressFinish, ProgressStyle};

use cooccur::cli;

fn main() {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .about("Parses aligned short-read text into co-occurrence matrices for the matrix viewer")
        .max_term_width(120)
        .setting(AppSettings::DeriveDisplayOrder)
        .args(cli::args::all())
        .get_matches();

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {spinner} {msg}")
        .tick_strings(&["▹▹▹▹▹", "▸▹▹▹▹", "▹▸▹▹▹", "▹▹▸▹▹", "▹▹▹▸▹", "▹▹▹▹▸", "▪▪▪▪▪"])
        .on_finish(ProgressFinish::AndLeave);
    let factory = || ProgressBar::new_spinner().with_style(style.clone());

    cli::run::run(&matches, factory);
}
