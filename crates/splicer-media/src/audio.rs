// crates/splicer-media/src/audio.rs
//
// Audio side of the combine pipeline.
//
//   AudioConverter: lazily-built resampler from any decoded format to FLTP stereo 44.1 kHz.
//   SegmentAudio:   collects exactly N samples for one output segment, placing
//                   decoded frames by PTS, trimming pre-roll and over-run, and
//                   filling gaps (or silent clips) with zeros.
//   AudioFifo:      stereo FLTP buffer in front of the AAC encoder, which needs
//                   exactly `frame_size` samples per input frame.
//   AudioEncState:  AAC encoder + FIFO + output sample counter.
//
// Because every segment contributes exactly the sample count the planner
// assigned it, audio and video stay locked together across any number of
// clips, with or without audio streams.

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::Sample;
use ffmpeg::format::sample::Type as SampleType;
use ffmpeg::software::resampling;
use ffmpeg::util::channel_layout::{ChannelLayout, ChannelLayoutMask};
use ffmpeg::util::frame::audio::Audio as AudioFrame;
use ffmpeg::util::rational::Rational;
use ffmpeg::Packet;

use crate::error::{FfmpegContext, Result};
use crate::plan::AUDIO_RATE;

const TARGET_FORMAT: Sample = Sample::F32(SampleType::Planar);

/// Left and right planes of an FLTP frame. Mono frames return plane 0 twice.
pub fn stereo_planes(frame: &AudioFrame) -> (&[f32], &[f32]) {
    let n = frame.samples();
    if n == 0 {
        return (&[], &[]);
    }
    // SAFETY: the frame is FLTP, so each plane holds at least `n` f32 samples
    // and the plane buffers are allocated with float alignment.
    unsafe {
        let l = std::slice::from_raw_parts(frame.data(0).as_ptr() as *const f32, n);
        let r_plane = if frame.ch_layout().channels() >= 2 { frame.data(1) } else { frame.data(0) };
        let r = std::slice::from_raw_parts(r_plane.as_ptr() as *const f32, n);
        (l, r)
    }
}

// ── Resampling ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct AudioConverter {
    resampler: Option<resampling::Context>,
}

impl AudioConverter {
    /// Convert `raw` to FLTP stereo at AUDIO_RATE. Returns `Ok(None)` when the
    /// resampler buffered everything and produced no output yet.
    pub fn convert(&mut self, raw: &AudioFrame) -> Result<Option<AudioFrame>> {
        let needs_resample = raw.format() != TARGET_FORMAT
            || raw.rate() != AUDIO_RATE
            || raw.ch_layout().channels() != 2;

        if !needs_resample {
            return Ok(Some(raw.clone()));
        }

        if self.resampler.is_none() {
            // Mono sources must be declared as MONO or swr misreads the layout.
            let src_layout = if raw.ch_layout().channels() >= 2 {
                raw.ch_layout()
            } else {
                ChannelLayout::MONO
            };
            let rs = resampling::Context::get2(
                raw.format(), src_layout,            raw.rate(),
                TARGET_FORMAT, ChannelLayout::STEREO, AUDIO_RATE,
            ).step("create audio resampler")?;
            self.resampler = Some(rs);
        }

        let Some(rs) = self.resampler.as_mut() else { return Ok(None) };
        let mut out = AudioFrame::empty();
        rs.run(raw, &mut out).step("resample audio")?;
        Ok((out.samples() > 0).then_some(out))
    }

    /// Drain the samples the resampler is still holding at end of stream.
    /// `Ok(None)` when nothing was resampled or nothing is left.
    pub fn flush(&mut self) -> Result<Option<AudioFrame>> {
        let Some(rs) = self.resampler.as_mut() else { return Ok(None) };
        // swr only flushes into a frame that already has the output layout.
        let mut out = AudioFrame::new(TARGET_FORMAT, FLUSH_CAPACITY, ChannelLayoutMask::STEREO);
        out.set_rate(AUDIO_RATE);
        rs.flush(&mut out).step("flush audio resampler")?;
        Ok((out.samples() > 0).then_some(out))
    }
}

/// Room for the resampler's filter delay at any supported input rate.
const FLUSH_CAPACITY: usize = 4096;

// ── Per-segment sample collector ──────────────────────────────────────────────

/// Collects exactly `target` samples for one segment.
///
/// Positions are in samples relative to the segment start. Samples before 0
/// (decoder pre-roll) and at or after `target` are discarded; holes are
/// zero-filled. Overlapping input (a frame starting before what has already
/// been written) is trimmed, never double-counted.
#[derive(Debug)]
pub struct SegmentAudio {
    target:  usize,
    written: usize,
    left:    Vec<f32>,
    right:   Vec<f32>,
}

/// Small PTS jitter between consecutive frames is ignored; larger jumps are
/// treated as real gaps and zero-filled.
const CONTIGUOUS_SLACK: i64 = (AUDIO_RATE / 20) as i64;

impl SegmentAudio {
    pub fn new(target: u64) -> Self {
        Self { target: target as usize, written: 0, left: Vec::new(), right: Vec::new() }
    }

    pub fn is_full(&self) -> bool {
        self.written >= self.target
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Place `l` / `r` starting at sample position `start`.
    ///
    /// After the first write, frames that start within a few milliseconds of
    /// the write head are appended contiguously; this absorbs resampler delay
    /// without clicks.
    pub fn push_at(&mut self, start: i64, l: &[f32], r: &[f32]) {
        let len = l.len().min(r.len());
        let head = self.written as i64;
        let start = if self.written > 0 && (start - head).abs() <= CONTIGUOUS_SLACK { head } else { start };

        let end = start + len as i64;
        if end <= head || self.is_full() {
            return;
        }
        if start > head {
            let gap = ((start - head) as usize).min(self.target - self.written);
            self.fill_zeros(gap);
        }
        let skip  = (self.written as i64 - start).max(0) as usize;
        let room  = self.target - self.written;
        let take  = (len - skip).min(room);
        self.left.extend_from_slice(&l[skip .. skip + take]);
        self.right.extend_from_slice(&r[skip .. skip + take]);
        self.written += take;
    }

    fn fill_zeros(&mut self, n: usize) {
        self.left.resize(self.left.len() + n, 0.0);
        self.right.resize(self.right.len() + n, 0.0);
        self.written += n;
    }

    /// Zero-pad up to the target length.
    pub fn finish(&mut self) {
        let missing = self.target.saturating_sub(self.written);
        self.fill_zeros(missing);
    }

    /// Take the samples collected since the last call.
    pub fn take(&mut self) -> (Vec<f32>, Vec<f32>) {
        (std::mem::take(&mut self.left), std::mem::take(&mut self.right))
    }
}

// ── Encoder FIFO ──────────────────────────────────────────────────────────────

/// Stereo FLTP sample buffer.
#[derive(Default)]
pub struct AudioFifo {
    left:  Vec<f32>,
    right: Vec<f32>,
}

impl AudioFifo {
    pub fn len(&self) -> usize { self.left.len() }

    pub fn is_empty(&self) -> bool { self.left.is_empty() }

    pub fn push(&mut self, l: &[f32], r: &[f32]) {
        let n = l.len().min(r.len());
        self.left.extend_from_slice(&l[..n]);
        self.right.extend_from_slice(&r[..n]);
    }

    /// Pop up to `n` samples per channel, zero-padded to exactly `n`.
    pub fn pop(&mut self, n: usize) -> (Vec<f32>, Vec<f32>) {
        let available = self.left.len().min(n);
        let mut l: Vec<f32> = self.left.drain(..available).collect();
        let mut r: Vec<f32> = self.right.drain(..available).collect();
        l.resize(n, 0.0);
        r.resize(n, 0.0);
        (l, r)
    }

    /// Pop one encoder-sized frame, PTS set to `sample_idx` (1/AUDIO_RATE timebase).
    fn pop_frame(&mut self, n: usize, sample_idx: i64) -> AudioFrame {
        let (l, r) = self.pop(n);

        let mut frame = AudioFrame::new(TARGET_FORMAT, n, ChannelLayoutMask::STEREO);
        frame.set_rate(AUDIO_RATE);
        frame.set_pts(Some(sample_idx));

        // SAFETY: the frame was just allocated as FLTP stereo with `n` samples.
        unsafe {
            let ldst = std::slice::from_raw_parts_mut(frame.data_mut(0).as_mut_ptr() as *mut f32, n);
            ldst.copy_from_slice(&l);
            let rdst = std::slice::from_raw_parts_mut(frame.data_mut(1).as_mut_ptr() as *mut f32, n);
            rdst.copy_from_slice(&r);
        }
        frame
    }
}

// ── AAC encoder state ─────────────────────────────────────────────────────────

pub struct AudioEncState {
    pub encoder:    ffmpeg::encoder::Audio,
    /// Next output frame's PTS in samples.
    out_sample_idx: i64,
    frame_size:     usize,
    pub fifo:       AudioFifo,
    stream_index:   usize,
    audio_tb:       Rational,
    /// Muxer-assigned timebase for the audio stream (may differ from audio_tb).
    ost_audio_tb:   Rational,
}

impl AudioEncState {
    pub fn new(
        encoder:      ffmpeg::encoder::Audio,
        stream_index: usize,
        ost_audio_tb: Rational,
    ) -> Self {
        // Guard against a codec that reports 0 (variable frame size).
        let frame_size = (encoder.frame_size() as usize).max(1024);
        Self {
            encoder,
            out_sample_idx: 0,
            frame_size,
            fifo: AudioFifo::default(),
            stream_index,
            audio_tb: Rational::new(1, AUDIO_RATE as i32),
            ost_audio_tb,
        }
    }

    /// Append samples and encode every full frame now available.
    pub fn push(
        &mut self,
        l:    &[f32],
        r:    &[f32],
        octx: &mut ffmpeg::format::context::Output,
    ) -> Result<()> {
        self.fifo.push(l, r);
        self.drain_fifo(octx, false)
    }

    /// Encode buffered samples. With `flush`, a partial tail frame is
    /// zero-padded and sent so no PCM is lost.
    pub fn drain_fifo(
        &mut self,
        octx:  &mut ffmpeg::format::context::Output,
        flush: bool,
    ) -> Result<()> {
        while self.fifo.len() >= self.frame_size || (flush && !self.fifo.is_empty()) {
            let frame = self.fifo.pop_frame(self.frame_size, self.out_sample_idx);
            self.out_sample_idx += self.frame_size as i64;
            self.encoder.send_frame(&frame).step("send audio frame to encoder")?;
            self.drain_packets(octx)?;
        }
        Ok(())
    }

    fn drain_packets(&mut self, octx: &mut ffmpeg::format::context::Output) -> Result<()> {
        let mut pkt = Packet::empty();
        while self.encoder.receive_packet(&mut pkt).is_ok() {
            pkt.set_stream(self.stream_index);
            pkt.rescale_ts(self.audio_tb, self.ost_audio_tb);
            pkt.write_interleaved(octx).step("write audio packet")?;
        }
        Ok(())
    }

    /// Flush the FIFO tail, send EOF, and write the remaining packets.
    pub fn finish(&mut self, octx: &mut ffmpeg::format::context::Output) -> Result<()> {
        self.drain_fifo(octx, true)?;
        self.encoder.send_eof().step("send EOF to audio encoder")?;
        self.drain_packets(octx)
    }
}
