// crates/splicer-media/src/encode.rs
//
// Combine pipeline: N source clips → one H.264 + AAC file.
//
// Design:
//   • `ClipSpec`:    one source clip plus its probed size and duration.
//   • `CombineSpec`: the complete job with clips in order, output canvas,
//                    frame rate, planned crossfades, encoder settings.
//   • `combine()`:   blocking; run it on its own thread. Called from
//                    MediaWorker::start_combine. Sends CombineProgress every
//                    PROGRESS_INTERVAL frames and CombineDone / CombineError
//                    on exit.
//
// Stream layout in the output:
//   Stream 0: H.264 video (YUV420P, CRF 23, preset from Settings)
//   Stream 1: AAC audio  (FLTP stereo, 44100 Hz, 128 kbps), only when at
//             least one clip has sound
//
// The timeline is planned up front (plan.rs) as Solo and Blend segments,
// each with an exact frame and sample count. Solo segments stream straight
// from one decoder into the encoders. Blend segments decode both sides into
// memory, then mix and encode them BLEND_CHUNK frames at a time (video in
// parallel on rayon), releasing source frames as each chunk is written.
//
// Output is written to a hidden temp file next to the destination and only
// renamed over it once the trailer is written, so a failed or cancelled
// combine never leaves a truncated file behind.

use std::path::{Path, PathBuf};
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};
use std::time::Instant;

use crossbeam_channel::Sender;
use rayon::prelude::*;
use uuid::Uuid;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::{self, Id as CodecId};
use ffmpeg::encoder;
use ffmpeg::format::{Pixel, Sample, output as open_output};
use ffmpeg::format::sample::Type as SampleType;
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::frame::audio::Audio as AudioFrame;
use ffmpeg::util::frame::video::Video as VideoFrame;
use ffmpeg::util::rational::Rational;
use ffmpeg::Packet;

use splicer_core::helpers::geometry::target_size;
use splicer_core::media_types::{ClipInfo, MediaResult};
use splicer_core::settings::{Settings, X264Preset};
use splicer_core::transitions::helpers::{black_frame, frame_alpha, mix_sample};
use splicer_core::transitions::{output_duration, plan_transitions, ClipTransition, Crossfade};

use crate::audio::{stereo_planes, AudioEncState, SegmentAudio};
use crate::error::{FfmpegContext, MediaError, Result};
use crate::helpers::normalize::FrameNormalizer;
use crate::helpers::sampler::FrameSampler;
use crate::helpers::yuv::frame_from_packed;
use crate::plan::{plan_segments, total_frames, Segment, SegmentKind, AUDIO_RATE};
use crate::reader::{ClipReader, SegmentSink};

// ── Public types ──────────────────────────────────────────────────────────────

/// One source clip's contribution to the output.
#[derive(Clone, Debug)]
pub struct ClipSpec {
    pub path:          PathBuf,
    /// Seconds into the source file at which this clip begins.
    pub source_offset: f64,
    /// Seconds of the source to use.
    pub duration:      f64,
    pub width:         u32,
    pub height:        u32,
    pub has_audio:     bool,
}

impl ClipSpec {
    /// The whole of a probed file.
    pub fn whole(path: PathBuf, info: ClipInfo) -> Self {
        Self {
            path,
            source_offset: 0.0,
            duration:      info.duration,
            width:         info.width,
            height:        info.height,
            has_audio:     info.has_audio,
        }
    }
}

/// Complete description of a combine job.
#[derive(Clone, Debug)]
pub struct CombineSpec {
    pub job_id:      Uuid,
    /// Clips in output order.
    pub clips:       Vec<ClipSpec>,
    /// Output canvas; every clip is fitted and centred inside it.
    pub width:       u32,
    pub height:      u32,
    pub fps:         u32,
    /// Destination file, including extension.
    pub output:      PathBuf,
    /// Crossfades between adjacent clips. Index N means "after clips[N]";
    /// missing entries are hard cuts.
    pub transitions: Vec<ClipTransition>,
    pub preset:      X264Preset,
    pub threads:     u32,
}

impl CombineSpec {
    /// Build a job from clips and the user's settings.
    ///
    /// The canvas is the largest width and largest height across all clips;
    /// crossfades are planned from the clip durations.
    pub fn new(job_id: Uuid, clips: Vec<ClipSpec>, output: PathBuf, settings: &Settings) -> Result<Self> {
        let settings = settings.clone().sanitized();
        let sizes: Vec<(u32, u32)> = clips.iter().map(|c| (c.width, c.height)).collect();
        let (width, height) = target_size(&sizes).ok_or(MediaError::Empty)?;
        let durations: Vec<f64> = clips.iter().map(|c| c.duration).collect();
        let transitions = plan_transitions(&durations, settings.crossfade);

        Ok(Self {
            job_id,
            clips,
            width,
            height,
            fps: settings.fps,
            output,
            transitions,
            preset: settings.preset,
            threads: settings.threads,
        })
    }

    pub fn has_audio(&self) -> bool {
        self.clips.iter().any(|c| c.has_audio)
    }

    /// Length of the combined output in seconds.
    pub fn output_duration(&self) -> f64 {
        let durations: Vec<f64> = self.clips.iter().map(|c| c.duration).collect();
        output_duration(&durations, &self.transitions)
    }
}

// ── Constants ─────────────────────────────────────────────────────────────────

/// Send a progress update every this many encoded video frames.
const PROGRESS_INTERVAL: u64 = 15;

/// Crossfade frames blended per rayon batch before they are encoded.
const BLEND_CHUNK: usize = 8;

const CRF:           &str = "23";
const AUDIO_BITRATE: usize = 128_000;

// ── Public entry point ────────────────────────────────────────────────────────

/// Combine `spec` to disk. Blocking; run this on a dedicated thread.
pub fn combine(spec: CombineSpec, cancel: Arc<AtomicBool>, tx: Sender<MediaResult>) {
    let started = Instant::now();
    log::info!(
        "[combine] job {}: {} clips → {} ({}x{} @ {} fps, {} crossfades)",
        spec.job_id, spec.clips.len(), spec.output.display(),
        spec.width, spec.height, spec.fps, spec.transitions.len(),
    );

    match run_combine(&spec, &cancel, &tx) {
        Ok(()) => {
            log::info!("[combine] job {} finished in {:.1?}", spec.job_id, started.elapsed());
            let _ = tx.send(MediaResult::CombineDone { job_id: spec.job_id, path: spec.output.clone() });
        }
        Err(e) => {
            let cancelled = matches!(e, MediaError::Cancelled);
            if cancelled {
                log::info!("[combine] job {} cancelled", spec.job_id);
            } else {
                log::error!("[combine] job {} failed: {e}", spec.job_id);
            }
            let _ = tx.send(MediaResult::CombineError { job_id: spec.job_id, msg: e.to_string(), cancelled });
        }
    }
}

// ── Internal implementation ───────────────────────────────────────────────────

struct Progress<'a> {
    job_id: Uuid,
    total:  u64,
    tx:     &'a Sender<MediaResult>,
}

impl Progress<'_> {
    fn report(&self, frame: u64) {
        if frame % PROGRESS_INTERVAL == 0 || frame == self.total {
            let _ = self.tx.send(MediaResult::CombineProgress {
                job_id:       self.job_id,
                frame,
                total_frames: self.total,
            });
        }
    }
}

/// Hidden temp file in the destination directory, carrying the destination's
/// extension so the muxer picks the right container.
fn temp_output(output: &Path) -> Result<tempfile::TempPath> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let ext = output.extension().and_then(|e| e.to_str()).unwrap_or("mp4");
    let file = tempfile::Builder::new()
        .prefix(".splicer-")
        .suffix(&format!(".{ext}"))
        .tempfile_in(dir)?;
    Ok(file.into_temp_path())
}

fn run_combine(spec: &CombineSpec, cancel: &AtomicBool, tx: &Sender<MediaResult>) -> Result<()> {
    if spec.clips.is_empty() {
        return Err(MediaError::Empty);
    }

    let segments = plan_segments(&spec.clips, &spec.transitions, spec.fps);
    let progress = Progress { job_id: spec.job_id, total: total_frames(&segments).max(1), tx };
    log::debug!("[combine] {} segments, {} frames, {:.2}s", segments.len(), progress.total, spec.output_duration());

    let tmp = temp_output(&spec.output)?;
    {
        let mut out = OutputFile::open(&tmp, spec)?;
        for seg in &segments {
            if cancel.load(Ordering::Relaxed) {
                return Err(MediaError::Cancelled);
            }
            match seg.kind {
                SegmentKind::Solo { clip, source_offset } => {
                    encode_solo(&spec.clips[clip], source_offset, seg, &mut out, &progress, cancel)?;
                }
                SegmentKind::Blend { from, to, from_offset } => {
                    encode_blend(spec, from, to, from_offset, seg, &mut out, &progress, cancel)?;
                }
            }
        }
        out.finish()?;
    }

    tmp.persist(&spec.output).map_err(|e| MediaError::Io(e.error))?;
    Ok(())
}

// ── Output file ───────────────────────────────────────────────────────────────

/// Muxer plus both encoders, with the running video PTS.
struct OutputFile {
    octx:         ffmpeg::format::context::Output,
    video:        encoder::video::Video,
    frame_tb:     Rational,
    ost_video_tb: Rational,
    audio:        Option<AudioEncState>,
    next_pts:     i64,
    canvas:       (u32, u32),
    fps:          u32,
}

impl OutputFile {
    fn open(path: &Path, spec: &CombineSpec) -> Result<Self> {
        let mut octx = open_output(path)
            .map_err(|source| MediaError::Open { path: path.to_path_buf(), source })?;

        // ── Video encoder (stream 0) ──────────────────────────────────────────
        let frame_tb = Rational::new(1, spec.fps as i32);

        let h264 = encoder::find(CodecId::H264).ok_or(MediaError::EncoderMissing("H.264"))?;
        let mut ost_video = octx.add_stream(h264).step("add video stream")?;
        ost_video.set_time_base(frame_tb);

        let mut video_enc = codec::context::Context::new_with_codec(h264)
            .encoder()
            .video()
            .step("create video encoder context")?;
        video_enc.set_width(spec.width);
        video_enc.set_height(spec.height);
        video_enc.set_format(Pixel::YUV420P);
        video_enc.set_time_base(frame_tb);
        video_enc.set_frame_rate(Some(Rational::new(spec.fps as i32, 1)));
        video_enc.set_bit_rate(0);

        let mut opts = ffmpeg::Dictionary::new();
        opts.set("crf",     CRF);
        opts.set("preset",  spec.preset.as_str());
        opts.set("threads", &spec.threads.to_string());

        let mut video = video_enc.open_as_with(h264, opts).step("open H.264 encoder")?;
        // libavcodec resets the SAR while opening, so square pixels are set
        // on the opened context, before its parameters are copied out.
        video.set_aspect_ratio(Rational::new(1, 1));
        copy_codec_parameters(&mut octx, 0, video.as_ptr())?;

        // ── Audio encoder (stream 1) ──────────────────────────────────────────
        let audio_encoder = if spec.has_audio() {
            let aac = encoder::find(CodecId::AAC).ok_or(MediaError::EncoderMissing("AAC"))?;
            let mut ost_audio = octx.add_stream(aac).step("add audio stream")?;
            ost_audio.set_time_base(Rational::new(1, AUDIO_RATE as i32));

            let mut audio_enc = codec::context::Context::new_with_codec(aac)
                .encoder()
                .audio()
                .step("create audio encoder context")?;
            audio_enc.set_rate(AUDIO_RATE as i32);
            audio_enc.set_ch_layout(ChannelLayout::STEREO);
            audio_enc.set_format(Sample::F32(SampleType::Planar));
            audio_enc.set_bit_rate(AUDIO_BITRATE);

            let audio = audio_enc.open_as_with(aac, ffmpeg::Dictionary::new()).step("open AAC encoder")?;
            copy_codec_parameters(&mut octx, 1, audio.as_ptr())?;
            Some(audio)
        } else {
            log::info!("[combine] no clip has audio; writing a video-only file");
            None
        };

        octx.write_header().step("write output header")?;

        // The muxer may replace stream time bases while writing the header.
        let ost_video_tb = stream_time_base(&octx, 0)?;
        let audio = match audio_encoder {
            Some(enc) => Some(AudioEncState::new(enc, 1, stream_time_base(&octx, 1)?)),
            None      => None,
        };

        Ok(Self {
            octx,
            video,
            frame_tb,
            ost_video_tb,
            audio,
            next_pts: 0,
            canvas: (spec.width, spec.height),
            fps:    spec.fps,
        })
    }

    fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    fn frames_written(&self) -> u64 {
        self.next_pts as u64
    }

    fn black(&self) -> VideoFrame {
        let (w, h) = self.canvas;
        frame_from_packed(&black_frame(w, h), w, h)
    }

    fn write_video(&mut self, frame: &VideoFrame) -> Result<()> {
        let mut frame = frame.clone();
        frame.set_pts(Some(self.next_pts));
        // Repeated frames must not carry the source's picture type, or every
        // duplicated I-frame would force a keyframe.
        frame.set_kind(ffmpeg::picture::Type::None);
        // SAFETY: `frame` is a valid, owned AVFrame. No safe SAR setter exists.
        unsafe {
            (*frame.as_mut_ptr()).sample_aspect_ratio = ffmpeg::ffi::AVRational { num: 1, den: 1 };
        }
        self.video.send_frame(&frame).step("send video frame to encoder")?;
        self.next_pts += 1;
        self.drain_video()
    }

    fn drain_video(&mut self) -> Result<()> {
        let mut pkt = Packet::empty();
        while self.video.receive_packet(&mut pkt).is_ok() {
            pkt.set_stream(0);
            pkt.rescale_ts(self.frame_tb, self.ost_video_tb);
            pkt.write_interleaved(&mut self.octx).step("write video packet")?;
        }
        Ok(())
    }

    fn write_audio(&mut self, l: &[f32], r: &[f32]) -> Result<()> {
        match self.audio.as_mut() {
            Some(audio) if !l.is_empty() => audio.push(l, r, &mut self.octx),
            _ => Ok(()),
        }
    }

    fn finish(mut self) -> Result<()> {
        self.video.send_eof().step("send EOF to video encoder")?;
        self.drain_video()?;
        if let Some(audio) = self.audio.as_mut() {
            audio.finish(&mut self.octx)?;
        }
        self.octx.write_trailer().step("write trailer")?;
        log::debug!("[combine] wrote {} video frames", self.next_pts);
        Ok(())
    }
}

pub(crate) fn stream_time_base(octx: &ffmpeg::format::context::Output, index: usize) -> Result<Rational> {
    octx.stream(index)
        .map(|s| s.time_base())
        .ok_or_else(|| MediaError::Pipeline(format!("output stream {index} missing")))
}

/// Copy an opened encoder's parameters into output stream `index`.
///
/// `set_parameters` needs `AsPtr<AVCodecParameters>`, which the encoder types
/// do not implement, so this goes through FFI.
pub(crate) fn copy_codec_parameters(
    octx:    &mut ffmpeg::format::context::Output,
    index:   usize,
    encoder: *const ffmpeg::ffi::AVCodecContext,
) -> Result<()> {
    // SAFETY: `index` was returned by add_stream on this context, and the
    // encoder pointer comes from a live, opened codec context.
    let ret = unsafe {
        ffmpeg::ffi::avcodec_parameters_from_context(
            (**(*octx.as_mut_ptr()).streams.add(index)).codecpar,
            encoder,
        )
    };
    if ret < 0 {
        return Err(MediaError::Ffmpeg {
            context: format!("copy encoder parameters to stream {index}"),
            source:  ffmpeg::Error::from(ret),
        });
    }
    Ok(())
}

// ── Solo segments ─────────────────────────────────────────────────────────────

/// Streams one clip straight into the encoders.
struct SoloSink<'a, 'p> {
    out:        &'a mut OutputFile,
    progress:   &'a Progress<'p>,
    normalizer: FrameNormalizer,
    sampler:    FrameSampler<VideoFrame>,
    /// `None` when the output has no audio stream.
    audio:      Option<SegmentAudio>,
    /// False when the source has no audio; the segment is padded with silence.
    wait_audio: bool,
}

impl SegmentSink for SoloSink<'_, '_> {
    fn video(&mut self, t: f64, frame: &VideoFrame) -> Result<()> {
        if self.sampler.is_full() {
            return Ok(());
        }
        let frame = self.normalizer.to_frame(frame)?;
        let out = &mut *self.out;
        let progress = self.progress;
        self.sampler.offer(t, frame, |f| {
            out.write_video(f)?;
            progress.report(out.frames_written());
            Ok(())
        })
    }

    fn audio(&mut self, t: Option<f64>, frame: &AudioFrame) -> Result<()> {
        let Some(seg) = self.audio.as_mut() else { return Ok(()) };
        let pos = t.map_or(seg.written() as i64, |t| (t * AUDIO_RATE as f64).round() as i64);
        let (l, r) = stereo_planes(frame);
        seg.push_at(pos, l, r);
        let (l, r) = seg.take();
        self.out.write_audio(&l, &r)
    }

    fn is_done(&self) -> bool {
        self.sampler.is_full()
            && (!self.wait_audio || self.audio.as_ref().map_or(true, SegmentAudio::is_full))
    }
}

fn encode_solo(
    clip:     &ClipSpec,
    start:    f64,
    seg:      &Segment,
    out:      &mut OutputFile,
    progress: &Progress<'_>,
    cancel:   &AtomicBool,
) -> Result<()> {
    log::debug!(
        "[combine] solo '{}' from {:.3}s for {:.3}s ({} frames)",
        clip.path.display(), start, seg.duration, seg.frames,
    );
    let reader = ClipReader::open(&clip.path, start, out.has_audio() && clip.has_audio)?;
    let wait_audio = reader.has_audio();
    let black = out.black();

    let mut sink = SoloSink {
        normalizer: FrameNormalizer::new(out.canvas, reader.rotation()),
        sampler:    FrameSampler::new(seg.frames, out.fps),
        audio:      out.has_audio().then(|| SegmentAudio::new(seg.samples)),
        wait_audio,
        out,
        progress,
    };
    reader.run(&mut sink, cancel)?;

    let SoloSink { out, mut sampler, audio, .. } = sink;
    if sampler.emitted() == 0 {
        log::warn!("[combine] '{}' produced no video frames; filling with black", clip.path.display());
    }
    sampler.finish(|| black, |f| {
        out.write_video(f)?;
        progress.report(out.frames_written());
        Ok(())
    })?;
    if let Some(mut seg_audio) = audio {
        seg_audio.finish();
        let (l, r) = seg_audio.take();
        out.write_audio(&l, &r)?;
    }
    Ok(())
}

// ── Blend segments ────────────────────────────────────────────────────────────

/// Decoded side of a crossfade, held in memory.
struct Collected {
    frames: Vec<Vec<u8>>,
    left:   Vec<f32>,
    right:  Vec<f32>,
}

struct CollectSink {
    normalizer: FrameNormalizer,
    sampler:    FrameSampler<Vec<u8>>,
    frames:     Vec<Vec<u8>>,
    audio:      Option<SegmentAudio>,
    wait_audio: bool,
}

impl SegmentSink for CollectSink {
    fn video(&mut self, t: f64, frame: &VideoFrame) -> Result<()> {
        if self.sampler.is_full() {
            return Ok(());
        }
        let packed = self.normalizer.to_packed(frame)?;
        let frames = &mut self.frames;
        self.sampler.offer(t, packed, |f| {
            frames.push(f.clone());
            Ok(())
        })
    }

    fn audio(&mut self, t: Option<f64>, frame: &AudioFrame) -> Result<()> {
        if let Some(seg) = self.audio.as_mut() {
            let pos = t.map_or(seg.written() as i64, |t| (t * AUDIO_RATE as f64).round() as i64);
            let (l, r) = stereo_planes(frame);
            seg.push_at(pos, l, r);
        }
        Ok(())
    }

    fn is_done(&self) -> bool {
        self.sampler.is_full()
            && (!self.wait_audio || self.audio.as_ref().map_or(true, SegmentAudio::is_full))
    }
}

fn collect_side(
    clip:       &ClipSpec,
    start:      f64,
    seg:        &Segment,
    canvas:     (u32, u32),
    fps:        u32,
    with_audio: bool,
    cancel:     &AtomicBool,
) -> Result<Collected> {
    let reader = ClipReader::open(&clip.path, start, with_audio && clip.has_audio)?;
    let mut sink = CollectSink {
        normalizer: FrameNormalizer::new(canvas, reader.rotation()),
        sampler:    FrameSampler::new(seg.frames, fps),
        frames:     Vec::with_capacity(seg.frames as usize),
        audio:      with_audio.then(|| SegmentAudio::new(seg.samples)),
        wait_audio: reader.has_audio(),
    };
    reader.run(&mut sink, cancel)?;

    let CollectSink { mut sampler, mut frames, audio, .. } = sink;
    sampler.finish(|| black_frame(canvas.0, canvas.1), |f| {
        frames.push(f.clone());
        Ok(())
    })?;
    let (left, right) = match audio {
        Some(mut a) => { a.finish(); a.take() }
        None        => (Vec::new(), Vec::new()),
    };
    Ok(Collected { frames, left, right })
}

#[allow(clippy::too_many_arguments)]
fn encode_blend(
    spec:        &CombineSpec,
    from:        usize,
    to:          usize,
    from_offset: f64,
    seg:         &Segment,
    out:         &mut OutputFile,
    progress:    &Progress<'_>,
    cancel:      &AtomicBool,
) -> Result<()> {
    let (a_clip, b_clip) = (&spec.clips[from], &spec.clips[to]);
    log::debug!(
        "[combine] crossfade '{}' → '{}' over {:.3}s ({} frames)",
        a_clip.path.display(), b_clip.path.display(), seg.duration, seg.frames,
    );

    let a = collect_side(a_clip, from_offset, seg, out.canvas, out.fps, out.has_audio(), cancel)?;
    let b = collect_side(b_clip, b_clip.source_offset, seg, out.canvas, out.fps, out.has_audio(), cancel)?;

    let m = a.left.len().min(b.left.len());
    let left:  Vec<f32> = (0..m).map(|j| mix_sample(a.left[j],  b.left[j],  frame_alpha(j, m))).collect();
    let right: Vec<f32> = (0..m).map(|j| mix_sample(a.right[j], b.right[j], frame_alpha(j, m))).collect();
    out.write_audio(&left, &right)?;

    let (w, h) = out.canvas;
    blend_in_chunks(a.frames, b.frames, BLEND_CHUNK, |packed| {
        if cancel.load(Ordering::Relaxed) {
            return Err(MediaError::Cancelled);
        }
        out.write_video(&frame_from_packed(&packed, w, h))?;
        progress.report(out.frames_written());
        Ok(())
    })
}

/// Crossfade `a` into `b` frame by frame, `chunk` frames at a time.
///
/// Each chunk is blended in parallel and handed to `write` in order before
/// the next one starts; the source frames of a chunk are dropped as soon as
/// it is blended. Alpha runs over the shorter side's length.
fn blend_in_chunks(
    a:         Vec<Vec<u8>>,
    b:         Vec<Vec<u8>>,
    chunk:     usize,
    mut write: impl FnMut(Vec<u8>) -> Result<()>,
) -> Result<()> {
    let n = a.len().min(b.len());
    let mut pairs = a.into_iter().zip(b);
    let mut done = 0;
    while done < n {
        let batch: Vec<(Vec<u8>, Vec<u8>)> = pairs.by_ref().take(chunk.max(1)).collect();
        if batch.is_empty() {
            break;
        }
        let blended: Vec<Vec<u8>> = batch.into_par_iter()
            .enumerate()
            .map(|(k, (fa, fb))| Crossfade.apply(&fa, &fb, frame_alpha(done + k, n)))
            .collect();
        done += blended.len();
        for packed in blended {
            write(packed)?;
        }
    }
    Ok(())
}
