use anyhow::{Context, Result};
use casefold_dispatch::MappingTable;
use log::info;
use std::fs;
use std::path::Path;

pub struct CaseFolding {
    /// First line of the file, e.g. `CaseFolding-16.0.0.txt`.
    pub version: Option<String>,
    pub table: MappingTable,
}

pub fn parse_case_folding(path: &Path) -> Result<CaseFolding> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!(
            "{}: failed to read\nDownload from https://www.unicode.org/Public/UCD/latest/ucd/CaseFolding.txt",
            path.display(),
        )
    })?;

    let version = contents
        .lines()
        .next()
        .and_then(|line| line.strip_prefix('#'))
        .map(|line| line.trim().to_owned())
        .filter(|line| !line.is_empty());
    let table = MappingTable::parse_case_folding(&contents);
    info!("{}: {} case conversions", path.display(), table.len());

    Ok(CaseFolding { version, table })
}
