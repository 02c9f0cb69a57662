use std::{
    fs,
    io::{self, Read, Write},
    path::Path,
};

use super::error::InfraError;

/// Path that stands for standard input.
pub const STDIN_MARKER: &str = "-";

/// Read a Markdown document from `path`, or from standard input for `-`.
pub fn read_document(path: &Path) -> Result<String, InfraError> {
    if path.as_os_str() == STDIN_MARKER {
        let mut buffer = String::new();
        io::stdin().lock().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }

    Ok(fs::read_to_string(path)?)
}

/// Write `text` to standard output followed by a newline.
pub fn write_stdout(text: &str) -> Result<(), InfraError> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
