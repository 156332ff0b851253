// crates/splicer-media/src/testing.rs
//
// Synthetic source clips for pipeline tests: a luma ramp that slides one
// step per frame, plus an optional 440 Hz tone. Written with the same
// encoders the combine uses, so anything the pipeline reads back went
// through a real H.264/AAC round trip.

use std::f32::consts::TAU;
use std::path::Path;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::codec::{self, Id as CodecId};
use ffmpeg::encoder;
use ffmpeg::format::sample::Type as SampleType;
use ffmpeg::format::{Pixel, Sample};
use ffmpeg::util::channel_layout::ChannelLayout;
use ffmpeg::util::rational::Rational;
use ffmpeg::{ffi, Packet};

use splicer_core::transitions::helpers::{uv_len, y_len};

use crate::audio::AudioEncState;
use crate::encode::{copy_codec_parameters, stream_time_base};
use crate::error::{FfmpegContext, MediaError, Result};
use crate::helpers::yuv::frame_from_packed;
use crate::plan::AUDIO_RATE;

pub struct SynthClip {
    size:     (u32, u32),
    seconds:  f64,
    fps:      u32,
    audio:    bool,
    rotation: Option<f64>,
    offset:   f64,
}

impl SynthClip {
    pub fn new(width: u32, height: u32) -> Self {
        Self { size: (width, height), seconds: 1.0, fps: 24, audio: false, rotation: None, offset: 0.0 }
    }

    pub fn seconds(mut self, secs: f64) -> Self {
        self.seconds = secs;
        self
    }

    pub fn with_audio(mut self) -> Self {
        self.audio = true;
        self
    }

    /// Counter-clockwise display matrix angle, the way phones record it.
    pub fn display_rotation(mut self, ccw: f64) -> Self {
        self.rotation = Some(ccw);
        self
    }

    /// Timestamp of the first video frame. Meant for `.ts` outputs, which
    /// keep timestamps as written.
    pub fn starting_at(mut self, secs: f64) -> Self {
        self.offset = secs;
        self
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let _ = ffmpeg::init();
        let (w, h) = self.size;
        let fps = self.fps as i32;
        let mut octx = ffmpeg::format::output(path)
            .map_err(|source| MediaError::Open { path: path.to_path_buf(), source })?;

        let tb = Rational::new(1, fps);
        let h264 = encoder::find(CodecId::H264).ok_or(MediaError::EncoderMissing("H.264"))?;
        let mut ost = octx.add_stream(h264).step("add video stream")?;
        ost.set_time_base(tb);

        let mut enc = codec::context::Context::new_with_codec(h264)
            .encoder()
            .video()
            .step("create video encoder context")?;
        enc.set_width(w);
        enc.set_height(h);
        enc.set_format(Pixel::YUV420P);
        enc.set_time_base(tb);
        enc.set_frame_rate(Some(Rational::new(fps, 1)));
        let mut opts = ffmpeg::Dictionary::new();
        opts.set("preset", "ultrafast");
        let mut video = enc.open_as_with(h264, opts).step("open H.264 encoder")?;
        copy_codec_parameters(&mut octx, 0, video.as_ptr())?;
        if let Some(ccw) = self.rotation {
            set_display_matrix(&mut octx, 0, ccw)?;
        }

        let audio_encoder = if self.audio {
            let aac = encoder::find(CodecId::AAC).ok_or(MediaError::EncoderMissing("AAC"))?;
            let mut ost = octx.add_stream(aac).step("add audio stream")?;
            ost.set_time_base(Rational::new(1, AUDIO_RATE as i32));
            let mut enc = codec::context::Context::new_with_codec(aac)
                .encoder()
                .audio()
                .step("create audio encoder context")?;
            enc.set_rate(AUDIO_RATE as i32);
            enc.set_ch_layout(ChannelLayout::STEREO);
            enc.set_format(Sample::F32(SampleType::Planar));
            enc.set_bit_rate(96_000);
            let audio = enc.open_as_with(aac, ffmpeg::Dictionary::new()).step("open AAC encoder")?;
            copy_codec_parameters(&mut octx, 1, audio.as_ptr())?;
            Some(audio)
        } else {
            None
        };

        octx.write_header().step("write header")?;
        let ost_tb = stream_time_base(&octx, 0)?;
        let mut audio = match audio_encoder {
            Some(enc) => Some(AudioEncState::new(enc, 1, stream_time_base(&octx, 1)?)),
            None      => None,
        };

        let frames = (self.seconds * f64::from(fps)).round() as i64;
        let first = (self.offset * f64::from(fps)).round() as i64;
        let per_frame = |i: i64| i as usize * AUDIO_RATE as usize / self.fps as usize;

        for i in 0..frames {
            let mut frame = frame_from_packed(&ramp(w, h, i), w, h);
            frame.set_pts(Some(first + i));
            video.send_frame(&frame).step("send video frame")?;
            write_video_packets(&mut video, &mut octx, tb, ost_tb)?;

            if let Some(a) = audio.as_mut() {
                let tone: Vec<f32> = (per_frame(i)..per_frame(i + 1))
                    .map(|n| (n as f32 * 440.0 * TAU / AUDIO_RATE as f32).sin() * 0.25)
                    .collect();
                a.push(&tone, &tone, &mut octx)?;
            }
        }

        video.send_eof().step("send EOF to video encoder")?;
        write_video_packets(&mut video, &mut octx, tb, ost_tb)?;
        if let Some(a) = audio.as_mut() {
            a.finish(&mut octx)?;
        }
        octx.write_trailer().step("write trailer")?;
        Ok(())
    }
}

/// Packed YUV420P frame whose luma ramps left to right, shifted by `i`.
fn ramp(w: u32, h: u32, i: i64) -> Vec<u8> {
    let mut packed = vec![128u8; y_len(w, h) + uv_len(w, h) * 2];
    for (n, px) in packed[..y_len(w, h)].iter_mut().enumerate() {
        let x = (n % w as usize) as i64;
        *px = 16 + ((x + i * 4) % 200) as u8;
    }
    packed
}

fn write_video_packets(
    enc:    &mut encoder::video::Video,
    octx:   &mut ffmpeg::format::context::Output,
    tb:     Rational,
    ost_tb: Rational,
) -> Result<()> {
    let mut pkt = Packet::empty();
    while enc.receive_packet(&mut pkt).is_ok() {
        pkt.set_stream(0);
        pkt.rescale_ts(tb, ost_tb);
        pkt.write_interleaved(octx).step("write video packet")?;
    }
    Ok(())
}

fn set_display_matrix(octx: &mut ffmpeg::format::context::Output, index: usize, ccw: f64) -> Result<()> {
    // SAFETY: stream `index` was added to this context; the new side data
    // entry is allocated with room for the nine-entry matrix and is owned by
    // the stream's codecpar.
    unsafe {
        let par = (**(*octx.as_mut_ptr()).streams.add(index)).codecpar;
        let sd = ffi::av_packet_side_data_new(
            &mut (*par).coded_side_data,
            &mut (*par).nb_coded_side_data,
            ffi::AVPacketSideDataType::AV_PKT_DATA_DISPLAYMATRIX,
            9 * std::mem::size_of::<i32>(),
            0,
        );
        if sd.is_null() {
            return Err(MediaError::Pipeline("could not attach a display matrix".into()));
        }
        ffi::av_display_rotation_set((*sd).data as *mut i32, ccw);
    }
    Ok(())
}
