// Primitives for reading the participant files.

use std::fs;
use std::path::Path;

use crate::draw::*;

/// Reads the whole participant file. The parsing itself is done by the session.
pub fn read_participants(path: &Path) -> BDrawCliResult<String> {
    let p = path.display().to_string();
    info!("Attempting to read participant file {:?}", p);
    let raw = fs::read_to_string(path).context(OpeningInputSnafu { path: p })?;
    debug!("read_participants: {} bytes", raw.len());
    Ok(raw)
}

/// The field separator to use when none is configured.
pub fn infer_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}
