use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{LmError, Result};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
///
/// # Errors
/// Returns `LmError::CorpusIo` carrying the path if the file cannot be opened or read.
pub(crate) fn read_lines<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let mut contents = String::new();
	File::open(path)
		.and_then(|mut file| file.read_to_string(&mut contents))
		.map_err(|source| LmError::CorpusIo { path: path.to_path_buf(), source })?;
	Ok(contents.lines().map(str::to_owned).collect())
}
