//! Temporary labeled corpus assembled for one training run

use crate::fasttext::LABEL_PREFIX;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use textcat_core::{Polarity, Result, TrainingRequest};
use tracing::{debug, warn};

/// Corpus file that is deleted when dropped.
///
/// Holds one `__label__<class> <text>` line per document: all positives
/// first, then all negatives, each group in request order.
#[derive(Debug)]
pub struct LabeledCorpus {
    path: PathBuf,
    lines: usize,
}

impl LabeledCorpus {
    /// Write the documents of `request` to `path`
    pub fn write(path: PathBuf, request: &TrainingRequest) -> Result<Self> {
        let file = File::create(&path)?;
        // from here on the guard owns the file, so a failed write still cleans up
        let mut corpus = Self { path, lines: 0 };

        let mut w = BufWriter::new(file);
        for polarity in [Polarity::Positive, Polarity::Negative] {
            for document in request.documents(polarity) {
                write_line(&mut w, polarity, document)?;
                corpus.lines += 1;
            }
        }
        w.flush()?;

        debug!("Wrote {} corpus lines to {}", corpus.lines, corpus.path.display());
        Ok(corpus)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of documents written
    pub fn len(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }
}

impl Drop for LabeledCorpus {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed corpus {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove corpus {}: {}", self.path.display(), e),
        }
    }
}

fn write_line(w: &mut impl Write, polarity: Polarity, document: &str) -> io::Result<()> {
    write!(w, "{LABEL_PREFIX}{polarity} ")?;
    // one document per line
    for (i, part) in document.split(['\n', '\r']).enumerate() {
        if i > 0 {
            w.write_all(b" ")?;
        }
        w.write_all(part.as_bytes())?;
    }
    w.write_all(b"\n")
}
