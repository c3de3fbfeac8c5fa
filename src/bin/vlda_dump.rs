//! Print the records of a VLDA object file.
//!
//! Usage:
//!   vlda_dump [OPTIONS] [FILE]
//!   vlda_dump < file.vlda
//!
//! Options:
//!   -a NUM   hex/ASCII dump of raw data, NUM bytes per row (implies -d)
//!   -d       hex/ASCII dump of raw data, 16 bytes per row
//!   -l NUM   maximum line width (default 200)
//!   -v       more logging on stderr (repeat for more)
//!
//! Exit code 1 on bad options or when the input cannot be read. A stream that goes out
//! of sync is reported on stdout and still exits 0.

use anyhow::Context;
use clap::Parser;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use vldadump::{load, write_stream, Decoder, Options};

#[derive(Parser, Debug)]
#[command(name = "vlda_dump", version, about = "Dump the records of a VLDA object file")]
struct Cli {
    /// VLDA file to read (standard input when omitted).
    file: Option<PathBuf>,

    /// Dump raw data as hex + ASCII with NUM bytes per row.
    #[arg(short = 'a', value_name = "NUM")]
    ascii_width: Option<usize>,

    /// Dump raw data as hex + ASCII (16 bytes per row unless -a is given).
    #[arg(short = 'd')]
    dump: bool,

    /// Maximum output line width in characters.
    #[arg(short = 'l', value_name = "NUM")]
    line_width: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = Options::from_flags(cli.line_width, cli.ascii_width, cli.dump)
        .context("invalid -l/-a combination")?;
    let image = load(cli.file.as_deref())?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "FileSize={}, fileExtent={}", image.bytes.len(), image.extent)?;
    let decoder = Decoder::new(&options);
    let summary = write_stream(&mut out, &image.bytes, &decoder)?;
    out.flush()?;

    log::info!("{} record(s) printed", summary.records);
    if let Some(event) = &summary.stopped {
        log::warn!("stopped early at record {}", event.index());
    }
    Ok(())
}
