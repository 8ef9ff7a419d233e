//! H.264 encoding of slideshow timelines through an `ffmpeg` child process.
//!
//! Frames are streamed to ffmpeg's stdin as raw RGB24; MP4 needs a seekable
//! output for its index, so the result goes to a temp file and is read back.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::process::Command;
use tracing::{debug, info};

use crate::application::video_encoder::{EncodedVideo, VideoEncoder};
use crate::domain::error::DomainError;
use crate::domain::slideshow::{Timeline, VideoProfile};

const PRESET: &str = "ultrafast";
const MP4_CONTENT_TYPE: &str = "video/mp4";
const MP4_EXTENSION: &str = "mp4";

#[derive(Debug, Error)]
pub(crate) enum EncodeError {
    #[error("failed to start '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg exited with {exit_code:?}: {stderr}")]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("ffmpeg produced an empty file")]
    EmptyOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<EncodeError> for DomainError {
    fn from(err: EncodeError) -> Self {
        DomainError::Unexpected(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct FfmpegEncoder {
    binary: String,
    threads: usize,
}

impl FfmpegEncoder {
    pub(crate) fn new(binary: impl Into<String>, threads: usize) -> Self {
        Self {
            binary: binary.into(),
            threads: threads.max(1),
        }
    }

    async fn encode_to(&self, timeline: &Timeline, output: &Path) -> Result<(), EncodeError> {
        let args = ffmpeg_args(timeline.profile(), self.threads, output);
        debug!(binary = %self.binary, ?args, "starting ffmpeg");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EncodeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EncodeError::Io(std::io::Error::other("ffmpeg stdin unavailable")))?;

        // stderr is drained by wait_with_output while frames are written.
        let feed = async move {
            let mut writer = BufWriter::new(stdin);
            for frame in timeline.frames() {
                writer.write_all(frame.as_raw()).await?;
            }
            writer.shutdown().await
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(EncodeError::Failed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        fed?;
        Ok(())
    }
}

#[async_trait]
impl VideoEncoder for FfmpegEncoder {
    async fn encode(&self, timeline: &Timeline) -> Result<EncodedVideo, DomainError> {
        let started = Instant::now();
        let temp = tempfile::Builder::new()
            .prefix("timelapse-")
            .suffix(".mp4")
            .tempfile()
            .map_err(EncodeError::from)?;
        let path: PathBuf = temp.path().to_path_buf();

        self.encode_to(timeline, &path).await?;

        let bytes = tokio::fs::read(&path).await.map_err(EncodeError::from)?;
        if bytes.is_empty() {
            return Err(EncodeError::EmptyOutput.into());
        }

        info!(
            frames = timeline.total_frames(),
            duration_ms = timeline.duration().as_millis() as u64,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "timeline encoded"
        );

        Ok(EncodedVideo {
            bytes,
            content_type: MP4_CONTENT_TYPE,
            extension: MP4_EXTENSION,
        })
    }
}

pub(crate) fn ffmpeg_args(profile: &VideoProfile, threads: usize, output: &Path) -> Vec<String> {
    let size = format!("{}x{}", profile.width, profile.height);
    let fps = profile.fps.to_string();
    let bitrate = format!("{}k", profile.bitrate_kbps);
    let threads = threads.to_string();

    let mut args: Vec<String> = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
        "-s",
        size.as_str(),
        "-framerate",
        fps.as_str(),
        "-i",
        "pipe:0",
        "-an",
        "-c:v",
        "libx264",
        "-preset",
        PRESET,
        "-b:v",
        bitrate.as_str(),
        "-pix_fmt",
        "yuv420p",
        "-r",
        fps.as_str(),
        "-threads",
        threads.as_str(),
        "-movflags",
        "+faststart",
    ]
    .iter()
    .map(|arg| arg.to_string())
    .collect();
    args.push(output.to_string_lossy().to_string());
    args
}
