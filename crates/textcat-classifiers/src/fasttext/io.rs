//! Binary model format
//!
//! Little-endian layout:
//!
//! ```text
//! magic u32 | version u32
//! epochs u32 | learning_rate f32 | word_ngrams u32 | buckets u32 | dim u32
//! loss u8 | min_count u32 | seed u64
//! ntokens u64 | nwords u32 | words... | nlabels u32 | labels...
//!   (entry = len u32 | utf-8 bytes | count u64)
//! input: rows u64 | cols u64 | f32 * rows * cols
//! output: rows u64 | cols u64 | f32 * rows * cols
//! ```

use super::dictionary::{Dictionary, Entry};
use super::matrix::Matrix;
use super::model::FastText;
use crate::config::{LossKind, TrainingConfig};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use textcat_core::{Error, Result};
use tracing::{debug, warn};

const MAGIC: u32 = 0x5443_4654;
const VERSION: u32 = 1;

const MAX_TOKEN_BYTES: u32 = 1 << 20;
const MAX_MATRIX_VALUES: u64 = 1 << 32;

impl FastText {
    /// Write the model to `path`.
    ///
    /// The bytes go to `<path>.tmp` first and are renamed into place, so
    /// `path` either holds a complete model or does not exist.
    pub fn save(&self, path: &Path) -> Result<()> {
        let staging = staging_path(path);
        let written = self
            .write_file(&staging)
            .and_then(|()| fs::rename(&staging, path).map_err(Error::from));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove {}: {}", staging.display(), cleanup);
                }
            }
            return Err(e);
        }
        debug!("Saved model to {}", path.display());
        Ok(())
    }

    fn write_file(&self, path: &Path) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        write_model(&mut w, self)?;
        w.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        Ok(())
    }

    /// Read a model written by [`FastText::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut r = BufReader::new(file);
        let model = read_model(&mut r).map_err(|e| match e {
            Error::Io(io) if io.kind() == io::ErrorKind::UnexpectedEof => {
                Error::model(format!("{} is truncated", path.display()))
            }
            other => other,
        })?;
        debug!("Loaded model from {}", path.display());
        Ok(model)
    }
}

/// `model_<id>.bin` -> `model_<id>.bin.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_model(w: &mut impl Write, model: &FastText) -> Result<()> {
    w.write_u32::<LittleEndian>(MAGIC)?;
    w.write_u32::<LittleEndian>(VERSION)?;

    let c = &model.config;
    w.write_u32::<LittleEndian>(c.epochs)?;
    w.write_f32::<LittleEndian>(c.learning_rate)?;
    w.write_u32::<LittleEndian>(c.word_ngrams)?;
    w.write_u32::<LittleEndian>(c.buckets)?;
    w.write_u32::<LittleEndian>(c.dim)?;
    w.write_u8(c.loss.to_byte())?;
    w.write_u32::<LittleEndian>(c.min_count)?;
    w.write_u64::<LittleEndian>(c.seed)?;

    let dict = &model.dict;
    w.write_u64::<LittleEndian>(dict.ntokens())?;
    write_entries(w, dict.words())?;
    write_entries(w, dict.labels())?;

    write_matrix(w, &model.input)?;
    write_matrix(w, &model.output)?;
    Ok(())
}

fn write_entries(w: &mut impl Write, entries: &[Entry]) -> Result<()> {
    w.write_u32::<LittleEndian>(len_u32(entries.len())?)?;
    for entry in entries {
        w.write_u32::<LittleEndian>(len_u32(entry.token.len())?)?;
        w.write_all(entry.token.as_bytes())?;
        w.write_u64::<LittleEndian>(entry.count)?;
    }
    Ok(())
}

fn write_matrix(w: &mut impl Write, m: &Matrix) -> Result<()> {
    w.write_u64::<LittleEndian>(m.rows() as u64)?;
    w.write_u64::<LittleEndian>(m.cols() as u64)?;
    for &x in m.data() {
        w.write_f32::<LittleEndian>(x)?;
    }
    Ok(())
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| Error::model(format!("length {len} does not fit the model format")))
}

fn read_model(r: &mut impl Read) -> Result<FastText> {
    let magic = r.read_u32::<LittleEndian>()?;
    if magic != MAGIC {
        return Err(Error::model(format!("not a textcat model (magic {magic:#010x})")));
    }
    let version = r.read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(Error::model(format!("unsupported model format version {version}")));
    }

    let epochs = r.read_u32::<LittleEndian>()?;
    let learning_rate = r.read_f32::<LittleEndian>()?;
    let word_ngrams = r.read_u32::<LittleEndian>()?;
    let buckets = r.read_u32::<LittleEndian>()?;
    let dim = r.read_u32::<LittleEndian>()?;
    let loss_byte = r.read_u8()?;
    let loss = LossKind::from_byte(loss_byte)
        .ok_or_else(|| Error::model(format!("unknown loss id {loss_byte}")))?;
    let min_count = r.read_u32::<LittleEndian>()?;
    let seed = r.read_u64::<LittleEndian>()?;

    let config = TrainingConfig {
        epochs,
        learning_rate,
        word_ngrams,
        buckets,
        dim,
        loss,
        min_count,
        seed,
    };

    let ntokens = r.read_u64::<LittleEndian>()?;
    let words = read_entries(r)?;
    let labels = read_entries(r)?;
    let dict = Dictionary::from_parts(
        words,
        labels,
        ntokens,
        word_ngrams as usize,
        buckets as usize,
    )?;

    let input = read_matrix(r)?;
    let output = read_matrix(r)?;

    if input.rows() != dict.input_rows() || input.cols() != dim as usize {
        return Err(Error::model(format!(
            "input matrix is {}x{}, expected {}x{}",
            input.rows(),
            input.cols(),
            dict.input_rows(),
            dim
        )));
    }
    if output.rows() != dict.nlabels() || output.cols() != dim as usize {
        return Err(Error::model(format!(
            "output matrix is {}x{}, expected {}x{}",
            output.rows(),
            output.cols(),
            dict.nlabels(),
            dim
        )));
    }

    Ok(FastText {
        config,
        dict,
        input,
        output,
    })
}

fn read_entries(r: &mut impl Read) -> Result<Vec<Entry>> {
    let n = r.read_u32::<LittleEndian>()?;
    let mut entries = Vec::new();
    for _ in 0..n {
        let len = r.read_u32::<LittleEndian>()?;
        if len > MAX_TOKEN_BYTES {
            return Err(Error::model(format!("token of {len} bytes exceeds the format limit")));
        }
        let mut bytes = vec![0u8; len as usize];
        r.read_exact(&mut bytes)?;
        let token = String::from_utf8(bytes)
            .map_err(|e| Error::model(format!("token is not valid utf-8: {e}")))?;
        let count = r.read_u64::<LittleEndian>()?;
        entries.push(Entry { token, count });
    }
    Ok(entries)
}

fn read_matrix(r: &mut impl Read) -> Result<Matrix> {
    let rows = r.read_u64::<LittleEndian>()?;
    let cols = r.read_u64::<LittleEndian>()?;
    let values = rows
        .checked_mul(cols)
        .filter(|&n| n <= MAX_MATRIX_VALUES)
        .ok_or_else(|| Error::model(format!("matrix {rows}x{cols} exceeds the format limit")))?;

    let mut data = vec![0.0f32; values as usize];
    r.read_f32_into::<LittleEndian>(&mut data)?;
    Matrix::from_raw(rows as usize, cols as usize, data)
}
