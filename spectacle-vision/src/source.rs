use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisionError};
use crate::landmark::NormalizedLandmark;

/// One detector callback: zero or more faces, each a full landmark set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceResults {
    #[serde(default)]
    pub faces: Vec<Vec<NormalizedLandmark>>,
}

// Detector dumps come either wrapped (`{"faces": [...]}`) or as a bare list of faces.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawResults {
    Wrapped(FaceResults),
    Bare(Vec<Vec<NormalizedLandmark>>),
}

impl From<RawResults> for FaceResults {
    fn from(raw: RawResults) -> Self {
        match raw {
            RawResults::Wrapped(r) => r,
            RawResults::Bare(faces) => FaceResults { faces },
        }
    }
}

/// Supplies detector results frame by frame.
pub trait LandmarkSource {
    /// Next result, or `None` once the detector stream has ended.
    fn next_result(&mut self) -> Result<Option<FaceResults>>;
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn next_result(&mut self) -> Result<Option<FaceResults>> {
        (**self).next_result()
    }
}

/// Reads one JSON result per line from an external detector process or dump.
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_result(&mut self) -> Result<Option<FaceResults>> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }

            let raw: RawResults = serde_json::from_str(text).map_err(|source| VisionError::Parse {
                line: self.line,
                source,
            })?;
            return Ok(Some(raw.into()));
        }
    }
}

/// Load a single detector result from a JSON file.
pub fn load_results(path: &Path) -> Result<FaceResults> {
    let raw = std::fs::read_to_string(path)?;
    let parsed: RawResults = serde_json::from_str(&raw)?;
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_lines_and_skips_blanks() {
        let input = "{\"faces\":[[{\"x\":0.1,\"y\":0.2,\"z\":0.0}]]}\n\n{\"faces\":[]}\n";
        let mut src = JsonLinesSource::new(Cursor::new(input));

        let first = src.next_result().unwrap().unwrap();
        assert_eq!(first.faces.len(), 1);
        assert_eq!(first.faces[0][0].x, 0.1);

        let second = src.next_result().unwrap().unwrap();
        assert!(second.faces.is_empty());

        assert!(src.next_result().unwrap().is_none());
    }

    #[test]
    fn test_bare_face_list() {
        let mut src = JsonLinesSource::new(Cursor::new("[[{\"x\":0.5,\"y\":0.5}]]\n"));
        let r = src.next_result().unwrap().unwrap();
        assert_eq!(r.faces[0][0].y, 0.5);
    }

    #[test]
    fn test_malformed_line_reports_number() {
        let mut src = JsonLinesSource::new(Cursor::new("{\"faces\":[]}\nnot json\n"));
        src.next_result().unwrap();
        match src.next_result() {
            Err(VisionError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
