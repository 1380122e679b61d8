//! Sample conversion: symphonia buffers → interleaved stereo f32,
//! streaming resampling, and output channel mapping

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::sample::Sample;
use tracing::debug;

/// Decoded audio is always carried as interleaved stereo
pub const DECODE_CHANNELS: usize = 2;

/// Interleave a planar buffer to stereo f32, duplicating mono
fn interleave_to_stereo_f32<T, F>(buf: &AudioBuffer<T>, normalize: F) -> Vec<f32>
where
    T: Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let mut output = Vec::with_capacity(frames * 2);

    for frame_idx in 0..frames {
        output.push(normalize(buf.chan(0)[frame_idx]));
        if channels > 1 {
            output.push(normalize(buf.chan(1)[frame_idx]));
        } else {
            output.push(normalize(buf.chan(0)[frame_idx]));
        }
    }

    output
}

/// Convert any decoded buffer to interleaved stereo f32 in [-1.0, 1.0]
pub fn to_stereo_f32(decoded: AudioBufferRef) -> Vec<f32> {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_to_stereo_f32(&buf, |s| s),
        AudioBufferRef::F64(buf) => interleave_to_stereo_f32(&buf, |s| s as f32),
        AudioBufferRef::S8(buf) => interleave_to_stereo_f32(&buf, |s| s as f32 / i8::MAX as f32),
        AudioBufferRef::S16(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i16::MAX as f32)
        }
        AudioBufferRef::S24(buf) => {
            interleave_to_stereo_f32(&buf, |s| s.inner() as f32 / 8_388_607.0)
        }
        AudioBufferRef::S32(buf) => {
            interleave_to_stereo_f32(&buf, |s| s as f32 / i32::MAX as f32)
        }
        AudioBufferRef::U8(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u8::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U16(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0)
        }
    }
}

/// Map interleaved stereo to the device's channel count
///
/// Mono devices get the average of both channels; extra channels are silent.
pub fn map_channels(stereo: &[f32], out_channels: usize) -> Vec<f32> {
    if out_channels == DECODE_CHANNELS {
        return stereo.to_vec();
    }

    let frames = stereo.len() / DECODE_CHANNELS;
    let mut output = Vec::with_capacity(frames * out_channels);

    for frame in stereo.chunks_exact(DECODE_CHANNELS) {
        if out_channels == 1 {
            output.push((frame[0] + frame[1]) * 0.5);
        } else {
            output.push(frame[0]);
            output.push(frame[1]);
            output.extend(std::iter::repeat(0.0).take(out_channels - DECODE_CHANNELS));
        }
    }

    output
}

/// Streaming stereo resampler
///
/// Accepts packets of any size. Input frames that do not fill a whole
/// resampler chunk are held back until the next packet.
pub struct StreamResampler {
    resampler: SincFixedIn<f32>,
    pending: [Vec<f32>; DECODE_CHANNELS],
}

impl StreamResampler {
    /// Create a resampler from `source_rate` to `target_rate`
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self> {
        let params = SincInterpolationParameters {
            sinc_len: 128,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        // 0.1 s chunks
        let chunk_frames = (source_rate as usize / 10).max(1);

        let resampler = SincFixedIn::<f32>::new(
            target_rate as f64 / source_rate as f64,
            2.0,
            params,
            chunk_frames,
            DECODE_CHANNELS,
        )
        .map_err(|e| AudioError::ResampleError(e.to_string()))?;

        Ok(Self {
            resampler,
            pending: [Vec::new(), Vec::new()],
        })
    }

    /// Feed interleaved stereo; returns whatever output is ready
    pub fn process(&mut self, stereo: &[f32]) -> Result<Vec<f32>> {
        for frame in stereo.chunks_exact(DECODE_CHANNELS) {
            self.pending[0].push(frame[0]);
            self.pending[1].push(frame[1]);
        }

        let mut output = Vec::new();
        loop {
            let needed = self.resampler.input_frames_next();
            if self.pending[0].len() < needed {
                break;
            }

            let chunk: Vec<Vec<f32>> = self
                .pending
                .iter_mut()
                .map(|channel| channel.drain(..needed).collect())
                .collect();

            let resampled = self
                .resampler
                .process(&chunk, None)
                .map_err(|e| AudioError::ResampleError(e.to_string()))?;

            let frames = resampled[0].len();
            output.reserve(frames * DECODE_CHANNELS);
            for frame_idx in 0..frames {
                output.push(resampled[0][frame_idx]);
                output.push(resampled[1][frame_idx]);
            }
        }

        Ok(output)
    }

    /// Frames waiting for a full chunk
    pub fn pending_frames(&self) -> usize {
        self.pending[0].len()
    }
}

/// Converts a live stream to the device rate
///
/// MP3 frames may change sample rate mid-stream; the resampler is rebuilt
/// whenever the source rate differs from the one it was built for.
pub struct RateAdapter {
    target_rate: u32,
    resampler: Option<(u32, StreamResampler)>,
}

impl RateAdapter {
    pub fn new(target_rate: u32) -> Self {
        Self {
            target_rate,
            resampler: None,
        }
    }

    /// Feed interleaved stereo decoded at `source_rate`
    pub fn process(&mut self, stereo: Vec<f32>, source_rate: u32) -> Result<Vec<f32>> {
        if source_rate == self.target_rate {
            self.resampler = None;
            return Ok(stereo);
        }

        let resampler = match &mut self.resampler {
            Some((rate, resampler)) if *rate == source_rate => resampler,
            slot => {
                debug!(source_rate, target_rate = self.target_rate, "Resampling");
                let fresh = StreamResampler::new(source_rate, self.target_rate)?;
                &mut slot.insert((source_rate, fresh)).1
            }
        };

        resampler.process(&stereo)
    }

    /// Rate the active resampler was built for
    pub fn source_rate(&self) -> Option<u32> {
        self.resampler.as_ref().map(|(rate, _)| *rate)
    }
}
