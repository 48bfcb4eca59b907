//! Corpus assembly: one text blob plus a dated output path.

use chrono::{Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{RnnError, RnnResult};

const OUTPUT_SUFFIX: &str = "rnn_output.txt";

/// Training text and the file the final sample is written to.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub text: String,
    pub output_path: PathBuf,
}

impl TrainingData {
    /// Load a corpus from a `.txt` file or a directory of `.txt` files,
    /// tagging the output path with today's date.
    ///
    /// # Errors
    /// `InvalidConfig` if `source` is neither an existing `.txt` file nor an
    /// existing directory; `Io` if reading fails.
    pub fn load(source: impl AsRef<Path>) -> RnnResult<Self> {
        Self::load_on(source, Local::now().date_naive())
    }

    /// Same as [`TrainingData::load`] with an explicit date tag.
    pub fn load_on(source: impl AsRef<Path>, date: NaiveDate) -> RnnResult<Self> {
        let source = source.as_ref();

        if source.is_file() && has_txt_extension(source) {
            let text = fs::read_to_string(source).map_err(|e| RnnError::io(source, e))?;
            let stem = source.with_extension("");
            let output_path = PathBuf::from(format!("{}_{}", stem.display(), dated_suffix(date)));
            debug!(path = %source.display(), chars = text.chars().count(), "loaded corpus file");
            return Ok(Self { text, output_path });
        }

        if source.is_dir() {
            let text = concat_txt_files(source)?;
            let name = source
                .file_name()
                .and_then(|s| s.to_str())
                .ok_or_else(|| {
                    RnnError::InvalidConfig(format!(
                        "cannot derive an output name from {}",
                        source.display()
                    ))
                })?;
            // Bare file name, resolved against the working directory.
            let output_path = PathBuf::from(format!("{name}_{}", dated_suffix(date)));
            return Ok(Self { text, output_path });
        }

        Err(RnnError::InvalidConfig(format!(
            "{} is neither a .txt file nor a directory",
            source.display()
        )))
    }
}

fn has_txt_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
}

fn dated_suffix(date: NaiveDate) -> String {
    format!("{}_{OUTPUT_SUFFIX}", date.format("%Y-%m-%d"))
}

/// Concatenate every `.txt` file in `dir`, sorted by name, each followed by a newline.
fn concat_txt_files(dir: &Path) -> RnnResult<String> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| RnnError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_txt_extension(path))
        .collect();
    files.sort();

    let mut text = String::new();
    for path in &files {
        let content = fs::read_to_string(path).map_err(|e| RnnError::io(path, e))?;
        text.push_str(&content);
        text.push('\n');
    }
    debug!(
        dir = %dir.display(),
        files = files.len(),
        chars = text.chars().count(),
        "assembled corpus"
    );
    Ok(text)
}
