// crates/splicer-media/src/error.rs

use std::path::PathBuf;

use ffmpeg_the_third as ffmpeg;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("nothing to combine: the clip list is empty")]
    Empty,

    #[error("could not open '{path}': {source}")]
    Open { path: PathBuf, #[source] source: ffmpeg::Error },

    #[error("no video stream in '{0}'")]
    NoVideoStream(PathBuf),

    #[error("could not determine the duration of '{0}'")]
    UnknownDuration(PathBuf),

    #[error("{0} encoder not found in this FFmpeg build")]
    EncoderMissing(&'static str),

    /// Any other FFmpeg call failure; `context` names the step.
    #[error("{context}: {source}")]
    Ffmpeg { context: String, #[source] source: ffmpeg::Error },

    #[error("{0}")]
    Pipeline(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, MediaError>;

/// Attach a step description to an FFmpeg error.
pub(crate) trait FfmpegContext<T> {
    fn step(self, context: impl Into<String>) -> Result<T>;
}

impl<T> FfmpegContext<T> for std::result::Result<T, ffmpeg::Error> {
    fn step(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|source| MediaError::Ffmpeg { context: context.into(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_file() {
        let e = MediaError::NoVideoStream(PathBuf::from("/tmp/song.mp3"));
        assert_eq!(e.to_string(), "no video stream in '/tmp/song.mp3'");
        assert_eq!(MediaError::Cancelled.to_string(), "cancelled");
    }
}
