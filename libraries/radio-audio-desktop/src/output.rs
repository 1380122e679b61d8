//! CPAL output device and the real-time sample feeder

use crate::control::StreamControl;
use crate::error::{AudioError, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Stream, StreamConfig};
use crossbeam_channel::Receiver;
use std::sync::Arc;
use tracing::debug;

/// Default output device with its preferred configuration
pub struct OutputDevice {
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
    channels: usize,
}

impl OutputDevice {
    /// Open the host's default output device
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let supported = device.default_output_config()?;
        let sample_rate = supported.sample_rate();
        let config = supported.config();
        let channels = usize::from(config.channels);

        debug!(sample_rate, channels, "Opened output device");

        Ok(Self {
            device,
            config,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Build an output stream fed from `samples`
    ///
    /// The returned stream is not started.
    pub fn build_stream<E>(
        &self,
        samples: Receiver<Vec<f32>>,
        control: Arc<StreamControl>,
        on_error: E,
    ) -> Result<Stream>
    where
        E: FnMut(cpal::StreamError) + Send + 'static,
    {
        let mut feeder = SampleFeeder::new(samples);
        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                feeder.fill(data, &control);
            },
            on_error,
            None,
        )?;
        Ok(stream)
    }
}

/// Pulls decoded chunks into the device buffer
///
/// Runs inside the audio callback: never blocks. Underruns and pauses
/// produce silence.
pub struct SampleFeeder {
    receiver: Receiver<Vec<f32>>,
    current: Vec<f32>,
    offset: usize,
}

impl SampleFeeder {
    pub fn new(receiver: Receiver<Vec<f32>>) -> Self {
        Self {
            receiver,
            current: Vec::new(),
            offset: 0,
        }
    }

    pub fn fill(&mut self, output: &mut [f32], control: &StreamControl) {
        if control.is_paused() || control.is_stopped() {
            output.fill(0.0);
            return;
        }

        let volume = control.volume();
        let mut written = 0;

        while written < output.len() {
            if self.offset >= self.current.len() {
                match self.receiver.try_recv() {
                    Ok(next) => {
                        self.current = next;
                        self.offset = 0;
                        continue;
                    }
                    Err(_) => break,
                }
            }

            let available = &self.current[self.offset..];
            let len = available.len().min(output.len() - written);
            for (out, sample) in output[written..written + len].iter_mut().zip(available) {
                *out = sample * volume;
            }
            written += len;
            self.offset += len;
        }

        output[written..].fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn feeds_across_chunks_with_volume() {
        let (tx, rx) = bounded(4);
        let control = StreamControl::new(0.5, false);
        let mut feeder = SampleFeeder::new(rx);

        tx.send(vec![1.0, 1.0, 1.0]).unwrap();
        tx.send(vec![]).unwrap();
        tx.send(vec![-1.0, -1.0]).unwrap();

        let mut out = [9.0f32; 4];
        feeder.fill(&mut out, &control);
        assert_eq!(out, [0.5, 0.5, 0.5, -0.5]);

        // Underrun after the last sample
        let mut out = [9.0f32; 3];
        feeder.fill(&mut out, &control);
        assert_eq!(out, [-0.5, 0.0, 0.0]);
    }

    #[test]
    fn paused_outputs_silence_without_consuming() {
        let (tx, rx) = bounded(4);
        let control = StreamControl::new(1.0, true);
        let mut feeder = SampleFeeder::new(rx);
        tx.send(vec![0.25, 0.25]).unwrap();

        let mut out = [9.0f32; 2];
        feeder.fill(&mut out, &control);
        assert_eq!(out, [0.0, 0.0]);

        control.set_paused(false);
        feeder.fill(&mut out, &control);
        assert_eq!(out, [0.25, 0.25]);
    }
}
