use log::{info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::archive::Archive;
use crate::codec::{compress, decompress};
use crate::error::Result;

/// Caller policies applied around the codec when working with files.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    /// Drop trailing ASCII whitespace before compressing. The decompressed
    /// file then differs from the input by that whitespace.
    pub trim_trailing_whitespace: bool,
}

/// `notes.txt` -> `notes.bin`, in the same directory.
pub fn compressed_path(input: &Path) -> PathBuf {
    input.with_extension("bin")
}

/// `notes.bin` -> `notes_decompressed.txt`, in the same directory.
pub fn decompressed_path(input: &Path) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push("_decompressed.txt");
    input.with_file_name(name)
}

/// Compresses `input` into an archive next to it and returns its path.
pub fn compress_file(input: impl AsRef<Path>, options: &FileOptions) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = compressed_path(input);
    compress_file_to(input, &output, options)?;
    Ok(output)
}

pub fn compress_file_to(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &FileOptions,
) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    ensure_distinct(input, output)?;

    let data = fs::read(input)?;
    let mut text = data.as_slice();
    if options.trim_trailing_whitespace {
        text = trim_end(text);
        if text.len() != data.len() {
            warn!(
                "dropped {} trailing whitespace bytes from {}",
                data.len() - text.len(),
                input.display()
            );
        }
    }

    let archive = Archive::from(compress(text)?);
    let bytes = archive.to_bytes()?;
    write_atomic(output, &bytes)?;

    info!(
        "{} ({} bytes) -> {} ({} bytes, ratio {:.3})",
        input.display(),
        data.len(),
        output.display(),
        bytes.len(),
        compression_ratio(data.len(), bytes.len())
    );
    Ok(())
}

/// Restores an archive into a text file next to it and returns its path.
pub fn decompress_file(input: impl AsRef<Path>) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = decompressed_path(input);
    decompress_file_to(input, &output)?;
    Ok(output)
}

pub fn decompress_file_to(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    ensure_distinct(input, output)?;

    let bytes = fs::read(input)?;
    let archive: Archive<u8> = Archive::from_bytes(&bytes)?;
    let text = decompress(archive.payload(), archive.table())?;
    write_atomic(output, &text)?;

    info!(
        "{} ({} bytes) -> {} ({} bytes)",
        input.display(),
        bytes.len(),
        output.display(),
        text.len()
    );
    Ok(())
}

/// Compressed size over original size; below 1.0 means the output shrank.
pub fn compression_ratio(original_len: usize, compressed_len: usize) -> f64 {
    if original_len == 0 {
        return 0.0;
    }
    compressed_len as f64 / original_len as f64
}

// Refuses an output that names the input file itself.
fn ensure_distinct(input: &Path, output: &Path) -> Result<()> {
    let same = input == output
        || matches!(
            (fs::canonicalize(input), fs::canonicalize(output)),
            (Ok(a), Ok(b)) if a == b
        );
    if same {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output {} would overwrite the input", output.display()),
        )
        .into());
    }

    Ok(())
}

fn trim_end(data: &[u8]) -> &[u8] {
    let end = data
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    &data[..end]
}

// Nothing appears at `path` unless the whole buffer was written.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
