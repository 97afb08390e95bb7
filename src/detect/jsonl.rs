use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufRead, BufReader};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use super::result::{BoundingBox, Detection};
use super::source::{DetectionSource, SourceStats};

/// Local JSONL detection feed.
///
/// Reads one frame batch per line from a local file or FIFO written by an
/// external detector process. Each line is a JSON object:
///
/// ```json
/// {"detections": [{"class_id": 17, "confidence": 0.93, "bbox": [0.2, 0.3, 0.6, 0.7]}]}
/// ```
///
/// bbox order is (y_min, x_min, y_max, x_max), normalized to [0,1]. A line
/// that fails to parse is skipped with a warning; the feed keeps going.
/// URL schemes are rejected, the feed must be a local path.
pub struct JsonlSource {
    path: String,
    reader: Option<BufReader<File>>,
    frames_delivered: u64,
    skipped_lines: u64,
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    detections: Vec<DetectionRecord>,
}

#[derive(Debug, Deserialize)]
struct DetectionRecord {
    class_id: u32,
    confidence: f32,
    bbox: [f32; 4],
}

impl From<DetectionRecord> for Detection {
    fn from(record: DetectionRecord) -> Self {
        let [y_min, x_min, y_max, x_max] = record.bbox;
        Detection {
            class_id: record.class_id,
            confidence: record.confidence,
            bbox: BoundingBox {
                y_min,
                x_min,
                y_max,
                x_max,
            },
        }
    }
}

impl JsonlSource {
    pub fn new(path: &str) -> Result<Self> {
        if path.contains("://") {
            return Err(anyhow!(
                "detection feed must be a local path (no URL schemes): {}",
                path
            ));
        }
        Ok(Self {
            path: path.to_string(),
            reader: None,
            frames_delivered: 0,
            skipped_lines: 0,
        })
    }

    pub fn skipped_lines(&self) -> u64 {
        self.skipped_lines
    }
}

impl DetectionSource for JsonlSource {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn connect(&mut self) -> Result<()> {
        let file =
            File::open(&self.path).with_context(|| format!("open detection feed {}", self.path))?;
        self.reader = Some(BufReader::new(file));
        log::info!("JsonlSource: reading detection batches from {}", self.path);
        Ok(())
    }

    fn next_batch(&mut self) -> Result<Option<Vec<Detection>>> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| anyhow!("detection feed {} not connected", self.path))?;

        let mut line = String::new();
        loop {
            line.clear();
            let bytes = reader.read_line(&mut line)?;
            if bytes == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<FrameRecord>(trimmed) {
                Ok(record) => {
                    let mut batch: Vec<Detection> =
                        record.detections.into_iter().map(Detection::from).collect();
                    // Producers should rank by confidence already; re-sort so
                    // the first entry is authoritative even for sloppy feeds.
                    batch.sort_by(|a, b| {
                        b.confidence
                            .partial_cmp(&a.confidence)
                            .unwrap_or(Ordering::Equal)
                    });
                    self.frames_delivered += 1;
                    return Ok(Some(batch));
                }
                Err(e) => {
                    self.skipped_lines += 1;
                    log::warn!("skipping malformed detection line: {}", e);
                }
            }
        }
    }

    fn is_healthy(&self) -> bool {
        self.reader.is_some()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_delivered: self.frames_delivered,
            endpoint: self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn feed_from(lines: &str) -> JsonlSource {
        let mut file = NamedTempFile::new().expect("temp feed");
        file.write_all(lines.as_bytes()).expect("write feed");
        let (_, path) = file.keep().expect("keep feed");
        let mut source = JsonlSource::new(path.to_str().unwrap()).expect("local path");
        source.connect().expect("connect");
        source
    }

    #[test]
    fn reads_one_batch_per_line() {
        let mut source = feed_from(
            "{\"detections\": [{\"class_id\": 17, \"confidence\": 0.93, \"bbox\": [0.2, 0.3, 0.6, 0.7]}]}\n\
             {\"detections\": []}\n",
        );

        let first = source.next_batch().unwrap().expect("first frame");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].class_id, 17);
        assert_eq!(first[0].bbox.x_min, 0.3);

        let second = source.next_batch().unwrap().expect("second frame");
        assert!(second.is_empty());

        assert!(source.next_batch().unwrap().is_none());
    }

    #[test]
    fn malformed_line_is_skipped_not_fatal() {
        let mut source = feed_from(
            "not json at all\n\
             {\"detections\": [{\"class_id\": 18, \"confidence\": 0.8, \"bbox\": [0.0, 0.0, 1.0, 1.0]}]}\n",
        );

        let batch = source.next_batch().unwrap().expect("recovered frame");
        assert_eq!(batch[0].class_id, 18);
        assert_eq!(source.skipped_lines(), 1);
    }

    #[test]
    fn batches_are_resorted_by_descending_confidence() {
        let mut source = feed_from(
            "{\"detections\": [\
               {\"class_id\": 1, \"confidence\": 0.4, \"bbox\": [0.0, 0.0, 0.2, 0.2]},\
               {\"class_id\": 17, \"confidence\": 0.95, \"bbox\": [0.4, 0.4, 0.6, 0.6]}]}\n",
        );

        let batch = source.next_batch().unwrap().unwrap();
        assert_eq!(batch[0].class_id, 17);
        assert_eq!(batch[1].class_id, 1);
    }

    #[test]
    fn url_schemes_are_rejected() {
        assert!(JsonlSource::new("http://example.com/feed.jsonl").is_err());
        assert!(JsonlSource::new("rtsp://camera/stream").is_err());
    }

    #[test]
    fn next_batch_before_connect_is_an_error() {
        let mut source = JsonlSource::new("missing.jsonl").unwrap();
        assert!(source.next_batch().is_err());
    }
}
