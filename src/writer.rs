use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::errors::SamplerError;
use crate::session::Selection;

/// Write the selection to `path` as JSONL, one raw line per record.
///
/// Returns the number of records written.
pub fn write_selection(path: &Path, selection: &Selection) -> Result<usize, SamplerError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let written = write_lines(&mut writer, selection.lines())?;
    writer.flush()?;
    Ok(written)
}

/// Write each line followed by `\n`; the line text itself is not touched.
pub fn write_lines<'a, W, I, L>(writer: &mut W, lines: I) -> Result<usize, SamplerError>
where
    W: Write,
    I: IntoIterator<Item = &'a L>,
    L: AsRef<str> + ?Sized + 'a,
{
    let mut written = 0;
    for line in lines {
        writer.write_all(line.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    Ok(written)
}
