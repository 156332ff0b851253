// crates/splicer-media/src/reader.rs
//
// ClipReader: opens one source file, seeks near a start time, and feeds
// decoded frames to a SegmentSink until the sink is satisfied or the file
// ends.
//
// Timestamps handed to the sink are relative to the requested start, so a
// sink never needs to know where in the source file it is reading. Frames
// before the start (seek pre-roll) arrive with negative times; sinks decide
// what to do with them.
//
// "Start" is measured from the file's own first presentation time, not from
// PTS 0: MPEG-TS captures and stream-copied trims often begin at 1.4s or
// later, and their first frame still belongs at t = 0.
//
// Video and audio come out of the same demuxer loop, so a sink sees them in
// container interleave order.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec;
use ffmpeg::ffi;
use ffmpeg::format::input as open_input;
use ffmpeg::media::Type as MediaType;
use ffmpeg::util::frame::audio::Audio as AudioFrame;
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::util::rational::Rational;

use crate::audio::AudioConverter;
use crate::error::{FfmpegContext, MediaError, Result};
use crate::helpers::rotation::stream_rotation;
use crate::helpers::seek::seek_to_secs;
use crate::plan::AUDIO_RATE;

/// Receives decoded frames for one output segment.
pub(crate) trait SegmentSink {
    /// Decoded (not yet normalised) video frame at `t` seconds.
    fn video(&mut self, t: f64, frame: &VideoFrame) -> Result<()>;
    /// FLTP stereo audio at `t` seconds, or `None` when the decoder gave no PTS.
    fn audio(&mut self, t: Option<f64>, frame: &AudioFrame) -> Result<()>;
    /// True once the sink needs nothing more from this file.
    fn is_done(&self) -> bool;
}

struct AudioInput {
    index:     usize,
    time_base: Rational,
    decoder:   ffmpeg::decoder::audio::Audio,
    converter: AudioConverter,
    /// Where the sample after the last one handed to the sink belongs.
    next_t:    Option<f64>,
}

/// Seconds from `zero` of a timestamp in `time_base` units.
fn seconds_since(pts: i64, time_base: Rational, zero: f64) -> f64 {
    pts as f64 * f64::from(time_base) - zero
}

/// Presentation time of the file's first frame or sample, in seconds.
///
/// The container start covers every stream, which keeps an audio track that
/// starts slightly before the video aligned with it. Falls back to the video
/// stream's own start, then to 0.
fn media_origin(container_start: i64, video_start: i64, video_tb: Rational) -> f64 {
    if container_start != ffi::AV_NOPTS_VALUE {
        container_start as f64 / f64::from(ffi::AV_TIME_BASE)
    } else if video_start != ffi::AV_NOPTS_VALUE {
        video_start as f64 * f64::from(video_tb)
    } else {
        0.0
    }
}

/// Video timing. Frames without a PTS are placed one source frame after the
/// previous one.
struct VideoClock {
    time_base:  Rational,
    frame_step: f64,
    /// File origin plus the requested start: the instant that maps to t = 0.
    zero:       f64,
    last:       Option<f64>,
}

impl VideoClock {
    fn time_of(&mut self, frame: &VideoFrame) -> f64 {
        let t = match frame.pts() {
            Some(pts) => seconds_since(pts, self.time_base, self.zero),
            None      => self.last.map_or(0.0, |l| l + self.frame_step),
        };
        self.last = Some(t);
        t
    }
}

pub(crate) struct ClipReader {
    path:          PathBuf,
    ictx:          ffmpeg::format::context::Input,
    video_index:   usize,
    video_decoder: ffmpeg::decoder::video::Video,
    clock:         VideoClock,
    audio:         Option<AudioInput>,
    rotation:      u32,
}

impl ClipReader {
    /// Open `path` positioned at or before `start` seconds.
    ///
    /// With `with_audio` false, or when the file has no usable audio stream,
    /// audio packets are skipped entirely.
    pub fn open(path: &Path, start: f64, with_audio: bool) -> Result<Self> {
        let mut ictx = open_input(path)
            .map_err(|source| MediaError::Open { path: path.to_path_buf(), source })?;
        let label = path.display().to_string();
        // SAFETY: `ictx` is an open input context.
        let container_start = unsafe { (*ictx.as_ptr()).start_time };

        let (video_index, video_decoder, clock, rotation, origin) = {
            let stream = ictx.streams().best(MediaType::Video)
                .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;
            let rate = stream.avg_frame_rate();
            let frame_step = if rate.numerator() > 0 && rate.denominator() > 0 {
                1.0 / f64::from(rate)
            } else {
                1.0 / 25.0
            };
            let decoder = codec::context::Context::from_parameters(stream.parameters())
                .step(format!("video decoder context for '{label}'"))?
                .decoder()
                .video()
                .step(format!("open video decoder for '{label}'"))?;
            let origin = media_origin(container_start, stream.start_time(), stream.time_base());
            let clock = VideoClock {
                time_base: stream.time_base(),
                frame_step,
                zero: origin + start,
                last: None,
            };
            (stream.index(), decoder, clock, stream_rotation(&stream), origin)
        };
        if origin != 0.0 {
            log::debug!("[reader] '{label}': timestamps start at {origin:.3}s");
        }

        // A broken audio stream costs the clip its sound, not the whole combine.
        let audio = if with_audio {
            ictx.streams().best(MediaType::Audio).and_then(|stream| {
                let decoder = codec::context::Context::from_parameters(stream.parameters())
                    .and_then(|ctx| ctx.decoder().audio());
                match decoder {
                    Ok(decoder) => Some(AudioInput {
                        index:     stream.index(),
                        time_base: stream.time_base(),
                        decoder,
                        converter: AudioConverter::default(),
                        next_t:    None,
                    }),
                    Err(e) => {
                        log::warn!("[reader] '{label}': audio decoder unavailable ({e}); using silence");
                        None
                    }
                }
            })
        } else {
            None
        };

        seek_to_secs(&mut ictx, start, origin, &label);

        Ok(Self { path: path.to_path_buf(), ictx, video_index, video_decoder, clock, audio, rotation })
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Clockwise turn that shows this file's video upright.
    pub fn rotation(&self) -> u32 {
        self.rotation
    }

    /// Decode until `sink.is_done()` or end of file, checking `cancel` per packet.
    pub fn run(self, sink: &mut impl SegmentSink, cancel: &AtomicBool) -> Result<()> {
        let ClipReader { path, mut ictx, video_index, mut video_decoder, mut clock, mut audio, .. } = self;
        let label = path.display().to_string();

        for result in ictx.packets() {
            let (stream, packet) = result.step(format!("read packet from '{label}'"))?;

            if cancel.load(Ordering::Relaxed) {
                return Err(MediaError::Cancelled);
            }
            if sink.is_done() {
                return Ok(());
            }

            let sidx = stream.index();
            if sidx == video_index {
                video_decoder.send_packet(&packet)
                    .step(format!("send video packet from '{label}'"))?;
                drain_video(&mut video_decoder, &mut clock, sink)?;
            } else if let Some(a) = audio.as_mut().filter(|a| a.index == sidx) {
                // A bad audio packet is dropped; the gap is zero-filled later.
                if a.decoder.send_packet(&packet).is_err() {
                    continue;
                }
                drain_audio(a, clock.zero, sink)?;
            }
        }

        // End of file: flush frames still buffered in the decoders.
        if !sink.is_done() {
            let _ = video_decoder.send_eof();
            drain_video(&mut video_decoder, &mut clock, sink)?;
        }
        if let Some(a) = audio.as_mut() {
            if !sink.is_done() {
                let _ = a.decoder.send_eof();
                drain_audio(a, clock.zero, sink)?;
            }
            if !sink.is_done() {
                if let Some(tail) = a.converter.flush()? {
                    sink.audio(a.next_t, &tail)?;
                }
            }
        }
        Ok(())
    }
}

fn drain_video(
    decoder: &mut ffmpeg::decoder::video::Video,
    clock:   &mut VideoClock,
    sink:    &mut impl SegmentSink,
) -> Result<()> {
    let mut decoded = VideoFrame::empty();
    while decoder.receive_frame(&mut decoded).is_ok() {
        let t = clock.time_of(&decoded);
        sink.video(t, &decoded)?;
    }
    Ok(())
}

fn drain_audio(input: &mut AudioInput, zero: f64, sink: &mut impl SegmentSink) -> Result<()> {
    let mut raw = AudioFrame::empty();
    while input.decoder.receive_frame(&mut raw).is_ok() {
        let t = raw.pts().map(|pts| seconds_since(pts, input.time_base, zero));
        if let Some(converted) = input.converter.convert(&raw)? {
            input.next_t = t.or(input.next_t)
                .map(|t| t + converted.samples() as f64 / f64::from(AUDIO_RATE));
            sink.audio(t, &converted)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SynthClip;
    use ffmpeg::format::Pixel;

    /// Records every timestamp it is handed and never asks to stop.
    #[derive(Default)]
    struct Recorder {
        video: Vec<f64>,
        audio: Vec<(Option<f64>, usize)>,
    }

    impl SegmentSink for Recorder {
        fn video(&mut self, t: f64, _frame: &VideoFrame) -> Result<()> {
            self.video.push(t);
            Ok(())
        }

        fn audio(&mut self, t: Option<f64>, frame: &AudioFrame) -> Result<()> {
            self.audio.push((t, frame.samples()));
            Ok(())
        }

        fn is_done(&self) -> bool {
            false
        }
    }

    #[test]
    fn origin_prefers_the_container_start() {
        let tb = Rational::new(1, 90_000);
        assert!((media_origin(1_400_000, 0, tb) - 1.4).abs() < 1e-9);
        assert!((media_origin(ffi::AV_NOPTS_VALUE, 90_000, tb) - 1.0).abs() < 1e-9);
        assert_eq!(media_origin(ffi::AV_NOPTS_VALUE, ffi::AV_NOPTS_VALUE, tb), 0.0);
    }

    #[test]
    fn clock_counts_from_origin_plus_start() {
        let mut clock = VideoClock {
            time_base:  Rational::new(1, 90_000),
            frame_step: 0.04,
            zero:       1.4 + 0.5,
            last:       None,
        };
        let mut frame = VideoFrame::new(Pixel::YUV420P, 16, 16);
        frame.set_pts(Some(171_000)); // 1.9s
        assert!(clock.time_of(&frame).abs() < 1e-9);

        frame.set_pts(None);
        assert!((clock.time_of(&frame) - 0.04).abs() < 1e-9);
    }

    #[test]
    fn late_starting_file_reads_from_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture.ts");
        SynthClip::new(64, 48).seconds(1.0).starting_at(1.0).write(&path).unwrap();

        let reader = ClipReader::open(&path, 0.0, false).unwrap();
        let mut rec = Recorder::default();
        reader.run(&mut rec, &AtomicBool::new(false)).unwrap();

        assert_eq!(rec.video.len(), 24);
        assert!(rec.video[0].abs() < 1e-3, "first frame at {}", rec.video[0]);
        assert!((rec.video[23] - 23.0 / 24.0).abs() < 1e-3);
    }

    #[test]
    fn audio_is_timed_from_the_start_of_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.mp4");
        SynthClip::new(64, 48).seconds(1.0).with_audio().write(&path).unwrap();

        let reader = ClipReader::open(&path, 0.0, true).unwrap();
        assert!(reader.has_audio());
        assert_eq!(reader.rotation(), 0);
        let mut rec = Recorder::default();
        reader.run(&mut rec, &AtomicBool::new(false)).unwrap();

        let total: usize = rec.audio.iter().map(|(_, n)| n).sum();
        // One second of 44.1 kHz audio, give or take AAC priming and padding.
        assert!(total.abs_diff(44_100) < 3_000, "got {total} samples");
        let (t, _) = rec.audio[0];
        assert!(t.is_some_and(|t| t.abs() < 0.05), "first audio at {t:?}");
    }
}
