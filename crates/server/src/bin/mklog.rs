//! Synthetic log fixture generator.
//!
//! Writes `<i> is even` / `<i> is odd` lines, the shape used for manual
//! drills against files far larger than RAM:
//!
//! ```text
//! mklog --lines 100000000 --out /var/log/tailgate/large.log
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about = "Generate a synthetic parity log file")]
struct Args {
    /// Number of lines to write
    #[arg(long)]
    lines: u64,

    /// Output file path
    #[arg(long)]
    out: PathBuf,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let mut out = BufWriter::new(File::create(&args.out)?);
    for i in 0..args.lines {
        let parity = if i % 2 == 0 { "even" } else { "odd" };
        writeln!(out, "{i} is {parity}")?;
    }

    out.flush()
}
