//! Detection sources.
//!
//! The object detector itself runs elsewhere. These adapters read what it
//! produced, one frame at a time:
//!
//! - [`LabelDirSource`]: a directory of YOLO label files (`class x y w h [conf]`
//!   per line, one file per frame)
//! - [`JsonLinesSource`]: one JSON object per line, e.g. piped from a live
//!   detector on stdin
//! - [`ReplaySource`]: frames already in memory

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use robot_link::CancelToken;
use serde::{Deserialize, Serialize};
use steering::{BoundingBox, Detection};
use thiserror::Error;
use tracing::debug;

/// Detections found in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub frame_id: u64,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(frame_id: u64, detections: Vec<Detection>) -> Self {
        Self {
            frame_id,
            detections,
        }
    }
}

/// Errors reading detections.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed detection at {location}: {reason}")]
    Malformed { location: String, reason: String },

    #[error("invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid label directory pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The operator interrupted a blocked read.
    #[error("read cancelled by operator")]
    Cancelled,
}

/// Pull-based supplier of frames.
///
/// Returns `Ok(None)` at end of stream. Sources are not restartable.
pub trait DetectionSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

/// Parse one YOLO label line: `class x y w h [conf]`.
///
/// Blank lines yield `Ok(None)`. A missing confidence is taken as 1.0, since
/// label files written by the detector do not record it. Box values and
/// confidence must lie in `[0, 1]`.
pub fn parse_label_line(line: &str) -> Result<Option<Detection>, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    if fields.len() != 5 && fields.len() != 6 {
        return Err(format!("expected 5 or 6 fields, found {}", fields.len()));
    }

    let class_id = parse_class(fields[0])?;
    let mut values = [0.0f64; 4];
    for (value, field) in values.iter_mut().zip(&fields[1..5]) {
        *value = field
            .parse::<f64>()
            .map_err(|e| format!("bad coordinate '{field}': {e}"))?;
    }
    let confidence = match fields.get(5) {
        Some(field) => field
            .parse::<f32>()
            .map_err(|e| format!("bad confidence '{field}': {e}"))?,
        None => 1.0,
    };

    let [x, y, width, height] = values;
    let detection = Detection::new(class_id, confidence, BoundingBox::new(x, y, width, height));
    detection.validate().map_err(|e| e.to_string())?;
    Ok(Some(detection))
}

/// Class ids are written with `%g`, so accept integral floats too.
fn parse_class(field: &str) -> Result<u32, String> {
    if let Ok(id) = field.parse::<u32>() {
        return Ok(id);
    }
    match field.parse::<f64>() {
        Ok(v) if v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
        _ => Err(format!("bad class id '{field}'")),
    }
}

/// Frames from a directory of YOLO label files.
///
/// Every `*.txt` file is one frame, visited in file-name order. Frame ids
/// count from zero in that order.
#[derive(Debug)]
pub struct LabelDirSource {
    files: std::vec::IntoIter<PathBuf>,
    next_id: u64,
}

impl LabelDirSource {
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        if !dir.is_dir() {
            return Err(SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("label directory {} not found", dir.display()),
            )));
        }

        let escaped = glob::Pattern::escape(&dir.to_string_lossy());
        let pattern = Path::new(&escaped).join("*.txt");
        let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
            .filter_map(Result::ok)
            .collect();
        files.sort();

        debug!("Found {} label files in {}", files.len(), dir.display());
        Ok(Self {
            files: files.into_iter(),
            next_id: 0,
        })
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }
}

impl DetectionSource for LabelDirSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        let Some(path) = self.files.next() else {
            return Ok(None);
        };

        let contents = std::fs::read_to_string(&path)?;
        let mut detections = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            let parsed = parse_label_line(line).map_err(|reason| SourceError::Malformed {
                location: format!("{}:{}", path.display(), idx + 1),
                reason,
            })?;
            detections.extend(parsed);
        }

        let frame = Frame::new(self.next_id, detections);
        self.next_id += 1;
        Ok(Some(frame))
    }
}

/// Frames from JSON lines, one [`Frame`] object per line.
///
/// Blank lines are skipped. Every detection is range-checked after parsing.
///
/// A read interrupted by a signal is resumed, unless the cancel token given
/// to [`with_cancel`](Self::with_cancel) is set, in which case
/// [`SourceError::Cancelled`] is returned. A partly read line is kept for
/// the next call.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    cancel: Option<CancelToken>,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            cancel: None,
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Stop a blocked read when `token` is set.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Append the rest of the current line to `buf`.
    ///
    /// Returns false at end of input with nothing buffered.
    fn fill_line(&mut self) -> Result<bool, SourceError> {
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    if self.cancel.as_ref().map_or(false, CancelToken::is_cancelled) {
                        return Err(SourceError::Cancelled);
                    }
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if available.is_empty() {
                return Ok(!self.buf.is_empty());
            }

            match available.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    self.buf.extend_from_slice(&available[..=end]);
                    self.reader.consume(end + 1);
                    return Ok(true);
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }

    fn parse_line(&self) -> Result<Option<Frame>, SourceError> {
        let location = || format!("line {}", self.line);

        let text = std::str::from_utf8(&self.buf).map_err(|e| SourceError::Malformed {
            location: location(),
            reason: e.to_string(),
        })?;
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let frame: Frame = serde_json::from_str(text).map_err(|source| SourceError::Json {
            line: self.line,
            source,
        })?;
        for detection in &frame.detections {
            detection
                .validate()
                .map_err(|e| SourceError::Malformed {
                    location: location(),
                    reason: e.to_string(),
                })?;
        }
        Ok(Some(frame))
    }
}

impl<R: BufRead> DetectionSource for JsonLinesSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        loop {
            if !self.fill_line()? {
                return Ok(None);
            }
            self.line += 1;

            let parsed = self.parse_line();
            self.buf.clear();
            if let Some(frame) = parsed? {
                return Ok(Some(frame));
            }
        }
    }
}

/// Frames held in memory.
#[derive(Debug, Default, Clone)]
pub struct ReplaySource {
    frames: VecDeque<Frame>,
}

impl ReplaySource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Frames numbered from zero, each with the given detections.
    pub fn from_detections(frames: impl IntoIterator<Item = Vec<Detection>>) -> Self {
        Self::new(
            frames
                .into_iter()
                .enumerate()
                .map(|(i, detections)| Frame::new(i as u64, detections)),
        )
    }
}

impl DetectionSource for ReplaySource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        Ok(self.frames.pop_front())
    }
}
