//! Video orientation probing
//!
//! `ffprobe` reports per-stream geometry; `ProbeClassifier` turns the first
//! stream into an `Orientation` using integer cross-multiplication against
//! 16:9 and 9:16 with an absolute tolerance.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tubely_core::Orientation;

/// Maximum absolute difference between cross-multiplied products.
const ASPECT_TOLERANCE: i64 = 10;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Probe failed: {0}")]
    ProbeFailure(String),

    #[error("No media stream found")]
    NoStreamFound,
}

/// Width and height of one reported stream. Missing values read as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct StreamGeometry {
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl StreamGeometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<StreamGeometry>,
}

/// Parse `ffprobe -print_format json -show_streams` output.
pub fn parse_probe_output(stdout: &[u8]) -> Result<Vec<StreamGeometry>, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::ProbeFailure(format!("Failed to parse ffprobe output: {}", e)))?;
    Ok(output.streams)
}

/// Classify a frame geometry.
///
/// Landscape when `|w*9 - h*16| < 10`, portrait when `|w*16 - h*9| < 10`,
/// otherwise other. Degenerate geometries (0x0, 1x1) fall inside the
/// landscape window and are classified as such.
pub fn classify_dimensions(width: u32, height: u32) -> Orientation {
    let (w, h) = (i64::from(width), i64::from(height));
    let diff_16x9 = (w * 9 - h * 16).abs();
    let diff_9x16 = (w * 16 - h * 9).abs();

    if diff_16x9 < ASPECT_TOLERANCE {
        Orientation::Landscape
    } else if diff_9x16 < ASPECT_TOLERANCE {
        Orientation::Portrait
    } else {
        Orientation::Other
    }
}

/// Reports the streams of a media file without modifying it.
#[async_trait]
pub trait FrameProbe: Send + Sync {
    async fn streams(&self, path: &Path) -> Result<Vec<StreamGeometry>, ProbeError>;
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
fn validate_path(path: &str) -> Result<(), ProbeError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProbeError::ProbeFailure(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ProbeError::ProbeFailure(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// `FrameProbe` backed by the ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: String,
    timeout: Duration,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Result<Self, ProbeError> {
        validate_path(&ffprobe_path)?;

        if !ffprobe_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(ProbeError::ProbeFailure(
                "Invalid ffprobe_path: contains unsafe characters".to_string(),
            ));
        }

        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }
}

#[async_trait]
impl FrameProbe for FfprobeProbe {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
    ))]
    async fn streams(&self, path: &Path) -> Result<Vec<StreamGeometry>, ProbeError> {
        let start = std::time::Instant::now();

        let run = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        // Dropping the future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| {
                ProbeError::ProbeFailure(format!(
                    "ffprobe timed out after {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ProbeError::ProbeFailure(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ProbeError::ProbeFailure(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let streams = parse_probe_output(&output.stdout)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            stream_count = streams.len(),
            "Video probe completed"
        );

        Ok(streams)
    }
}

/// Classifies staged videos by orientation.
#[derive(Clone)]
pub struct ProbeClassifier {
    probe: Arc<dyn FrameProbe>,
}

impl ProbeClassifier {
    pub fn new(probe: Arc<dyn FrameProbe>) -> Self {
        Self { probe }
    }

    /// Classify the file at `path` by its first reported stream.
    pub async fn classify(&self, path: &Path) -> Result<Orientation, ProbeError> {
        let streams = self.probe.streams(path).await?;
        let first = streams.first().ok_or(ProbeError::NoStreamFound)?;
        let orientation = classify_dimensions(first.width, first.height);

        tracing::debug!(
            width = first.width,
            height = first.height,
            orientation = %orientation,
            "Classified video orientation"
        );

        Ok(orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe(Vec<StreamGeometry>);

    #[async_trait]
    impl FrameProbe for FixedProbe {
        async fn streams(&self, _path: &Path) -> Result<Vec<StreamGeometry>, ProbeError> {
            Ok(self.0.clone())
        }
    }

    struct FailingProbe;

    #[async_trait]
    impl FrameProbe for FailingProbe {
        async fn streams(&self, _path: &Path) -> Result<Vec<StreamGeometry>, ProbeError> {
            Err(ProbeError::ProbeFailure("exit status: 1".to_string()))
        }
    }

    #[test]
    fn test_reference_geometries() {
        assert_eq!(classify_dimensions(1920, 1080), Orientation::Landscape);
        assert_eq!(classify_dimensions(1080, 1920), Orientation::Portrait);
        assert_eq!(classify_dimensions(1000, 1000), Orientation::Other);
    }

    #[test]
    fn test_tolerance_is_absolute() {
        // |1921*9 - 1080*16| = 9
        assert_eq!(classify_dimensions(1921, 1080), Orientation::Landscape);
        // |1922*9 - 1080*16| = 18
        assert_eq!(classify_dimensions(1922, 1080), Orientation::Other);
    }

    #[test]
    fn test_scale_invariance() {
        let bases = [(16, 9), (9, 16), (1920, 1080), (1080, 1920), (1000, 1000), (640, 480)];
        for (w, h) in bases {
            let expected = classify_dimensions(w, h);
            for k in 1..=64u32 {
                assert_eq!(classify_dimensions(w * k, h * k), expected, "{}x{} * {}", w, h, k);
            }
        }
        assert_eq!(classify_dimensions(16, 9), Orientation::Landscape);
        assert_eq!(classify_dimensions(9, 16), Orientation::Portrait);
    }

    #[test]
    fn test_large_dimensions_do_not_overflow() {
        assert_eq!(
            classify_dimensions(u32::MAX / 9 * 9, u32::MAX / 16 * 9),
            Orientation::Other
        );
        assert_eq!(classify_dimensions(16 << 26, 9 << 26), Orientation::Landscape);
    }

    #[test]
    fn test_degenerate_dimensions_follow_formula() {
        // Streams without geometry (audio) parse as 0x0.
        assert_eq!(classify_dimensions(0, 0), Orientation::Landscape);
        assert_eq!(classify_dimensions(1, 1), Orientation::Landscape);
        assert_eq!(classify_dimensions(2, 1), Orientation::Landscape);
        assert_eq!(classify_dimensions(1920, 0), Orientation::Other);
    }

    #[test]
    fn test_parse_probe_output() {
        let stdout = br#"{
            "streams": [
                {"index": 0, "codec_type": "video", "width": 1280, "height": 720},
                {"index": 1, "codec_type": "audio"}
            ]
        }"#;
        let streams = parse_probe_output(stdout).unwrap();
        assert_eq!(streams, vec![StreamGeometry::new(1280, 720), StreamGeometry::new(0, 0)]);

        assert!(parse_probe_output(b"{}").unwrap().is_empty());
        assert!(matches!(
            parse_probe_output(b"not json"),
            Err(ProbeError::ProbeFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_classifier_uses_first_stream() {
        let classifier = ProbeClassifier::new(Arc::new(FixedProbe(vec![
            StreamGeometry::new(1080, 1920),
            StreamGeometry::new(1920, 1080),
        ])));
        let orientation = classifier.classify(Path::new("/tmp/video.mp4")).await.unwrap();
        assert_eq!(orientation, Orientation::Portrait);
    }

    #[tokio::test]
    async fn test_classifier_fails_closed() {
        let empty = ProbeClassifier::new(Arc::new(FixedProbe(Vec::new())));
        assert!(matches!(
            empty.classify(Path::new("/tmp/video.mp4")).await,
            Err(ProbeError::NoStreamFound)
        ));

        let failing = ProbeClassifier::new(Arc::new(FailingProbe));
        assert!(matches!(
            failing.classify(Path::new("/tmp/video.mp4")).await,
            Err(ProbeError::ProbeFailure(_))
        ));
    }

    #[test]
    fn test_ffprobe_path_validation() {
        assert!(FfprobeProbe::new("/usr/bin/ffprobe".to_string(), Duration::from_secs(30)).is_ok());
        assert!(FfprobeProbe::new("ffprobe; rm -rf /".to_string(), Duration::from_secs(30)).is_err());
        assert!(FfprobeProbe::new("../ffprobe".to_string(), Duration::from_secs(30)).is_err());
    }

    #[cfg(unix)]
    mod ffprobe {
        use super::*;
        use crate::staging::StagingArea;
        use std::os::unix::fs::PermissionsExt;
        use std::path::PathBuf;

        /// Write an executable stand-in for ffprobe.
        fn fake_ffprobe(dir: &Path, body: &str) -> String {
            let path: PathBuf = dir.join("ffprobe");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        #[tokio::test]
        async fn test_non_zero_exit_is_probe_failure() {
            let dir = tempfile::tempdir().unwrap();
            let bin = fake_ffprobe(dir.path(), "echo 'moov atom not found' >&2\nexit 1");
            let probe = FfprobeProbe::new(bin, Duration::from_secs(5)).unwrap();

            match probe.streams(Path::new("/tmp/video.mp4")).await {
                Err(ProbeError::ProbeFailure(msg)) => assert!(msg.contains("moov atom not found")),
                other => panic!("expected ProbeFailure, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_hung_probe_times_out() {
            let dir = tempfile::tempdir().unwrap();
            let bin = fake_ffprobe(dir.path(), "exec sleep 10");
            let probe = FfprobeProbe::new(bin, Duration::from_secs(1)).unwrap();

            let started = std::time::Instant::now();
            let result = probe.streams(Path::new("/tmp/video.mp4")).await;

            assert!(matches!(result, Err(ProbeError::ProbeFailure(_))));
            assert!(started.elapsed() < Duration::from_secs(5));
        }

        #[tokio::test]
        async fn test_staging_dir_with_unusual_characters() {
            let root = tempfile::tempdir().unwrap();
            std::fs::create_dir_all(root.path().join("a")).unwrap();
            std::fs::create_dir_all(root.path().join("stage(1)")).unwrap();
            let staging = StagingArea::new(Some(root.path().join("a/../stage(1)")));

            let mut body = &b"not really an mp4"[..];
            let staged = staging.stage(&mut body, 1024).await.unwrap();

            let bin = fake_ffprobe(
                root.path(),
                r#"echo '{"streams":[{"width":1080,"height":1920}]}'"#,
            );
            let classifier = ProbeClassifier::new(Arc::new(
                FfprobeProbe::new(bin, Duration::from_secs(5)).unwrap(),
            ));

            let orientation = classifier.classify(staged.path()).await.unwrap();
            assert_eq!(orientation, Orientation::Portrait);
        }
    }
}
