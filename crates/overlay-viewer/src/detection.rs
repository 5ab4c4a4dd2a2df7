use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use serde::{Deserialize, Serialize};

/// One labeled bounding box.
///
/// Corners are normalized to `[0, 1]` with y growing downwards (image
/// convention); `color` is straight RGB in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
    pub color: [f32; 3],
    pub label: String,
    #[serde(default)]
    pub score: f32,
}

impl Detection {
    /// Copy with ordered corners, coordinates and color clamped to `[0, 1]`
    /// and non-finite values replaced by 0.
    pub fn normalized(&self) -> Self {
        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let (x0, x1) = (unit(self.xmin), unit(self.xmax));
        let (y0, y1) = (unit(self.ymin), unit(self.ymax));
        Self {
            xmin: x0.min(x1),
            ymin: y0.min(y1),
            xmax: x0.max(x1),
            ymax: y0.max(y1),
            color: self.color.map(unit),
            label: self.label.clone(),
            score: if self.score.is_finite() { self.score } else { 0.0 },
        }
    }
}

/// The three fixed detections of the demo scene, for an image `width x height`.
///
/// The first two touch the image corners one pixel in, the third is centered.
pub fn demo_detections(width: u32, height: u32) -> Vec<Detection> {
    let px = 1.0 / width.max(1) as f32;
    let py = 1.0 / height.max(1) as f32;
    vec![
        Detection {
            xmin: px,
            ymin: py,
            xmax: 0.5,
            ymax: 0.5,
            color: [1.0, 0.0, 0.0],
            label: "Object 1".into(),
            score: 0.98,
        },
        Detection {
            xmin: 0.5,
            ymin: 0.5,
            xmax: 1.0 - px,
            ymax: 1.0 - py,
            color: [0.0, 1.0, 0.0],
            label: "Object 2".into(),
            score: 0.7,
        },
        Detection {
            xmin: 0.15,
            ymin: 0.25,
            xmax: 0.85,
            ymax: 0.75,
            color: [0.0, 0.0, 1.0],
            label: "Object 3".into(),
            score: 0.54,
        },
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("failed to read detections from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid detections JSON in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a JSON array of detections; every entry is normalized.
pub fn load_detections(path: impl AsRef<Path>) -> Result<Vec<Detection>, DetectionError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| DetectionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Vec<Detection> = serde_json::from_str(&text).map_err(|source| DetectionError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(raw.iter().map(Detection::normalized).collect())
}

/// Supplies the detections to show on the next frame.
pub trait DetectionSource {
    fn poll(&mut self, now: Instant) -> &[Detection];
}

/// Fixed list, returned every frame.
pub struct StaticSource {
    detections: Vec<Detection>,
}

impl StaticSource {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections: detections.iter().map(Detection::normalized).collect(),
        }
    }
}

impl DetectionSource for StaticSource {
    fn poll(&mut self, _now: Instant) -> &[Detection] {
        &self.detections
    }
}

/// JSON file reloaded whenever its modification time changes.
///
/// The file is checked at most once per `interval`. A reload that fails keeps
/// the previous detections.
pub struct FileSource {
    path: PathBuf,
    interval: Duration,
    last_check: Instant,
    modified: Option<SystemTime>,
    detections: Vec<Detection>,
}

impl FileSource {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);

    /// Loads the file once; a missing or malformed file is an error here.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DetectionError> {
        let path = path.into();
        let modified = modified_time(&path);
        let detections = load_detections(&path)?;
        log::info!("loaded {} detections from {}", detections.len(), path.display());
        Ok(Self {
            path,
            interval: Self::DEFAULT_INTERVAL,
            last_check: Instant::now(),
            modified,
            detections,
        })
    }

    fn reload_if_changed(&mut self) {
        let modified = modified_time(&self.path);
        if modified.is_none() || modified == self.modified {
            return;
        }
        self.modified = modified;

        match load_detections(&self.path) {
            Ok(detections) => {
                log::debug!(
                    "reloaded {} detections from {}",
                    detections.len(),
                    self.path.display()
                );
                self.detections = detections;
            }
            Err(err) => {
                log::warn!("{err}: {}; keeping previous detections", error_source(&err));
            }
        }
    }
}

impl DetectionSource for FileSource {
    fn poll(&mut self, now: Instant) -> &[Detection] {
        if now.saturating_duration_since(self.last_check) >= self.interval {
            self.last_check = now;
            self.reload_if_changed();
        }
        &self.detections
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn error_source(err: &DetectionError) -> String {
    match err {
        DetectionError::Io { source, .. } => source.to_string(),
        DetectionError::Parse { source, .. } => source.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    const ONE: &str = r#"[
        {"xmin":0.1,"ymin":0.2,"xmax":0.3,"ymax":0.4,"color":[1,0,0],"label":"cat","score":0.9}
    ]"#;
    const TWO: &str = r#"[
        {"xmin":0.1,"ymin":0.2,"xmax":0.3,"ymax":0.4,"color":[1,0,0],"label":"cat"},
        {"xmin":0.5,"ymin":0.5,"xmax":0.6,"ymax":0.6,"color":[0,1,0],"label":"dog"}
    ]"#;

    fn write_with_mtime(path: &Path, contents: &str, mtime: SystemTime) {
        let mut f = File::create(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.set_modified(mtime).unwrap();
    }

    #[test]
    fn normalized_orders_and_clamps() {
        let d = Detection {
            xmin: 0.8,
            ymin: 1.5,
            xmax: 0.2,
            ymax: -0.1,
            color: [2.0, f32::NAN, 0.5],
            label: "x".into(),
            score: f32::INFINITY,
        }
        .normalized();
        assert_eq!((d.xmin, d.xmax), (0.2, 0.8));
        assert_eq!((d.ymin, d.ymax), (0.0, 1.0));
        assert_eq!(d.color, [1.0, 0.0, 0.5]);
        assert_eq!(d.score, 0.0);
    }

    #[test]
    fn demo_scene_matches_image_size() {
        let dets = demo_detections(200, 100);
        assert_eq!(dets.len(), 3);
        assert_eq!(dets[0].xmin, 1.0 / 200.0);
        assert_eq!(dets[0].ymin, 1.0 / 100.0);
        assert_eq!(dets[1].xmax, 1.0 - 1.0 / 200.0);
        assert_eq!(dets[2].label, "Object 3");
        assert_eq!(dets[2].color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn score_defaults_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        std::fs::write(&path, TWO).unwrap();
        let dets = load_detections(&path).unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].score, 0.0);
        assert_eq!(dets[1].label, "dog");
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_detections(&path), Err(DetectionError::Parse { .. })));
        assert!(matches!(
            load_detections(dir.path().join("missing.json")),
            Err(DetectionError::Io { .. })
        ));
    }

    #[test]
    fn file_source_reloads_on_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        let t0 = SystemTime::now() - Duration::from_secs(60);
        write_with_mtime(&path, ONE, t0);

        let mut src = FileSource::open(&path).unwrap();
        let start = Instant::now();
        assert_eq!(src.poll(start).len(), 1);

        write_with_mtime(&path, TWO, t0 + Duration::from_secs(10));
        // too soon: still the cached list
        assert_eq!(src.poll(start).len(), 1);
        assert_eq!(src.poll(start + Duration::from_secs(1)).len(), 2);
    }

    #[test]
    fn file_source_keeps_previous_on_bad_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.json");
        let t0 = SystemTime::now() - Duration::from_secs(60);
        write_with_mtime(&path, ONE, t0);

        let mut src = FileSource::open(&path).unwrap();
        let start = Instant::now();

        write_with_mtime(&path, "[{", t0 + Duration::from_secs(10));
        assert_eq!(src.poll(start + Duration::from_secs(1)).len(), 1);

        std::fs::remove_file(&path).unwrap();
        assert_eq!(src.poll(start + Duration::from_secs(2)).len(), 1);
    }

    #[test]
    fn static_source_normalizes_once() {
        let mut src = StaticSource::new(vec![Detection {
            xmin: 0.9,
            ymin: 0.0,
            xmax: 0.1,
            ymax: 1.0,
            color: [0.0; 3],
            label: "a".into(),
            score: 1.0,
        }]);
        let dets = src.poll(Instant::now());
        assert_eq!((dets[0].xmin, dets[0].xmax), (0.1, 0.9));
    }
}
