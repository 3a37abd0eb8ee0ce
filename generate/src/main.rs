// To regenerate the dispatch code, run the following in the repo root:
//
// $ curl -LO https://www.unicode.org/Public/UCD/latest/ucd/CaseFolding.txt
// $ cargo run --manifest-path generate/Cargo.toml -- CaseFolding.txt -o ucase.inc
// $ cargo run --manifest-path generate/Cargo.toml -- CaseFolding.txt --utf8 ucase

mod parse;

use anyhow::{Context, Result};
use argh::FromArgs;
use casefold_dispatch::{
    generate, generate_segmented, Config, MappingTable, Output, Return, Stats, Strategies,
    DEFAULT_GAP,
};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Compile CaseFolding.txt into balanced range-dispatch C code.
#[derive(FromArgs)]
struct Args {
    /// path to CaseFolding.txt
    #[argh(positional, default = "PathBuf::from(\"CaseFolding.txt\")")]
    input: PathBuf,

    /// merge gap for single-width output
    #[argh(option, default = "DEFAULT_GAP")]
    gap: u32,

    /// merge gap for UTF-8 length segmented output
    #[argh(option, default = "DEFAULT_GAP")]
    utf8_gap: u32,

    /// never use the constant offset rule
    #[argh(switch)]
    no_delta: bool,

    /// never use the offset-with-one-exception rule
    #[argh(switch)]
    no_delta_exception: bool,

    /// never use the `c | 1` rule
    #[argh(switch)]
    no_set: bool,

    /// never use the `c | 1` rule with an exception run
    #[argh(switch)]
    no_set_exception: bool,

    /// allow the bit-0-insensitive reset rule
    #[argh(switch)]
    reset: bool,

    /// write one artifact per UTF-8 length class into this directory
    #[argh(option)]
    utf8: Option<PathBuf>,

    /// output file for single-width code (default stdout)
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// name of the codepoint variable in generated code
    #[argh(option, default = "String::from(\"c\")")]
    var: String,

    /// variable assigned by UTF-8 segmented code
    #[argh(option, default = "String::from(\"r\")")]
    result: String,

    /// wrap single-width code in a C function of this name
    #[argh(option)]
    function: Option<String>,

    /// write the folded value of every BMP codepoint to this file
    #[argh(option)]
    dump: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            gap: self.gap,
            utf8_gap: self.utf8_gap,
            strategies: Strategies {
                delta: !self.no_delta,
                delta_exception: !self.no_delta_exception,
                set: !self.no_set,
                set_exception: !self.no_set_exception,
                reset: self.reset,
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args: Args = argh::from_env();
    let config = args.config();

    let data = parse::parse_case_folding(&args.input)?;
    if let Some(path) = &args.dump {
        write_dump(path, &data.table)?;
    }

    let mut header = Output::new();
    if let Some(version) = &data.version {
        writeln!(header, "// Generated from {}", version);
    }

    match &args.utf8 {
        Some(dir) => write_segmented(dir, &args, &config, &data, header.as_str()),
        None => write_single(&args, &config, &data, header.as_str()),
    }
}

fn write_single(
    args: &Args,
    config: &Config,
    data: &parse::CaseFolding,
    header: &str,
) -> Result<()> {
    let generated = generate(&data.table, config, &args.var, &Return);
    info!("{}", generated.stats);

    let mut out = Output::new();
    out.push_str(header);
    if let Some(function) = &args.function {
        writeln!(out, "#include <stdint.h>");
        writeln!(out);
        writeln!(out, "unsigned {}(unsigned {})", function, args.var);
        writeln!(out, "{{");
        out.push_str(&generated.code);
        writeln!(out, "}}");
    } else {
        out.push_str(&generated.code);
    }
    write_trailer(&mut out, data.table.len(), &generated.stats);

    match &args.output {
        Some(path) => write_file(path, out),
        None => io::stdout()
            .write_all(out.as_ref())
            .context("failed to write to stdout"),
    }
}

fn write_segmented(
    dir: &Path,
    args: &Args,
    config: &Config,
    data: &parse::CaseFolding,
    header: &str,
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("{}: failed to create directory", dir.display()))?;

    let mut total = Stats::default();
    for segment in generate_segmented(&data.table, config, &args.var, &args.result) {
        let (lo, hi) = segment.class.range().into_inner();
        let conversions = data.table.range(lo..=hi).count();

        let mut out = Output::new();
        out.push_str(header);
        writeln!(
            out,
            "// UTF-8 length {}: U+{:04X}..U+{:04X}",
            segment.class.byte_len(),
            lo,
            hi,
        );
        out.push_str(&segment.generated.code);
        write_trailer(&mut out, conversions, &segment.generated.stats);

        let path = dir.join(format!("fold_utf8_{}.inc", segment.class.byte_len()));
        write_file(&path, out)?;
        info!("{}: {}", path.display(), segment.generated.stats);
        total.merge(&segment.generated.stats);
    }
    info!("total: {}", total);
    Ok(())
}

fn write_trailer(out: &mut Output, conversions: usize, stats: &Stats) {
    writeln!(out, "// {} case conversions", conversions);
    writeln!(out, "// {}", stats);
}

fn write_dump(path: &Path, table: &MappingTable) -> Result<()> {
    let mut out = Output::new();
    for codepoint in 0..0x10000 {
        writeln!(out, "{:04X} => {:04X}", codepoint, table.fold(codepoint));
    }
    write_file(path, out)
}

fn write_file(path: &Path, out: Output) -> Result<()> {
    fs::write(path, out).with_context(|| format!("{}: failed to write", path.display()))
}
