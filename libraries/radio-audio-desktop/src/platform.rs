//! Desktop implementation of the platform audio API
//!
//! Each opened stream gets a decoder thread that owns everything that is
//! not `Send` (the CPAL stream in particular):
//!
//! ```text
//! reqwest (download thread) → bytes → symphonia → resample → channel map
//!                                      (decoder thread)          ↓
//!                                          cpal callback ← sample queue
//! ```
//!
//! The stream reports `Loaded` once the first decoded audio has been queued
//! to a running output stream. Any failure is reported once as
//! `StreamStatus::Error`; transport failures carry a `network:` prefix.

use crate::control::StreamControl;
use crate::convert::{map_channels, to_stereo_f32, RateAdapter};
use crate::download::{spawn_download, READ_TIMEOUT};
use crate::error::{AudioError, Result};
use crate::output::OutputDevice;
use cpal::traits::StreamTrait;
use crossbeam_channel::{bounded, SendTimeoutError, Sender};
use radio_playback::{
    AudioPlatform, OpenRequest, PlaybackError, StatusCallback, StreamFault, StreamHandle,
    StreamStatus,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

/// Decoded chunks queued ahead of the audio callback
const SAMPLE_QUEUE_CHUNKS: usize = 32;

/// How often a blocked decoder re-checks the stop flag
const STOP_POLL: Duration = Duration::from_millis(100);

/// Opens live streams on the default output device
#[derive(Debug, Clone)]
pub struct DesktopAudioPlatform {
    read_timeout: Duration,
}

impl DesktopAudioPlatform {
    pub fn new() -> Self {
        Self {
            read_timeout: READ_TIMEOUT,
        }
    }

    /// Fail a stream whose server stays silent for longer than `timeout`
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }
}

impl Default for DesktopAudioPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlatform for DesktopAudioPlatform {
    fn open(
        &mut self,
        request: OpenRequest,
        on_status: StatusCallback,
    ) -> radio_playback::Result<Box<dyn StreamHandle>> {
        let control = Arc::new(StreamControl::new(
            request.initial_volume,
            !request.start_playing,
        ));
        let reporter = StatusReporter::new(on_status, Arc::clone(&control));

        let thread_control = Arc::clone(&control);
        let uri = request.uri;
        let read_timeout = self.read_timeout;
        thread::Builder::new()
            .name("radio-decoder".to_string())
            .spawn(move || run_stream(&uri, read_timeout, &thread_control, &reporter))
            .map_err(|e| PlaybackError::from(AudioError::Thread(e)))?;

        Ok(Box::new(DesktopStreamHandle { control }))
    }
}

/// Handle to one desktop stream
///
/// Dropping or closing it stops the worker threads; they exit on their own
/// and release the device and connection.
pub struct DesktopStreamHandle {
    control: Arc<StreamControl>,
}

impl StreamHandle for DesktopStreamHandle {
    fn play(&mut self) -> radio_playback::Result<()> {
        self.control.set_paused(false);
        Ok(())
    }

    fn pause(&mut self) -> radio_playback::Result<()> {
        self.control.set_paused(true);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> radio_playback::Result<()> {
        self.control.set_volume(volume);
        Ok(())
    }

    fn close(self: Box<Self>) {
        debug!("Closing desktop stream");
    }
}

impl Drop for DesktopStreamHandle {
    fn drop(&mut self) {
        self.control.stop();
    }
}

/// Reports `Loaded` and the first failure exactly once each
#[derive(Clone)]
struct StatusReporter {
    callback: Arc<StatusCallback>,
    control: Arc<StreamControl>,
    loaded: Arc<AtomicBool>,
    failed: Arc<AtomicBool>,
}

impl StatusReporter {
    fn new(callback: StatusCallback, control: Arc<StreamControl>) -> Self {
        Self {
            callback: Arc::new(callback),
            control,
            loaded: Arc::new(AtomicBool::new(false)),
            failed: Arc::new(AtomicBool::new(false)),
        }
    }

    fn loaded(&self) {
        if !self.loaded.swap(true, Ordering::SeqCst) {
            info!("Stream loaded");
            (self.callback)(StreamStatus::Loaded);
        }
    }

    fn fail(&self, message: String) {
        // A closed stream has no one left to tell
        if self.control.is_stopped() {
            return;
        }
        if !self.failed.swap(true, Ordering::SeqCst) {
            warn!(error = %message, "Stream failed");
            (self.callback)(StreamStatus::Error(StreamFault::new(message)));
        }
    }
}

fn run_stream(
    uri: &str,
    read_timeout: Duration,
    control: &Arc<StreamControl>,
    reporter: &StatusReporter,
) {
    match play_stream(uri, read_timeout, control, reporter) {
        Ok(()) => debug!("Decoder stopped"),
        Err(err) => reporter.fail(err.to_string()),
    }
}

fn play_stream(
    uri: &str,
    read_timeout: Duration,
    control: &Arc<StreamControl>,
    reporter: &StatusReporter,
) -> Result<()> {
    let reader = spawn_download(uri.to_string(), control.stop_flag(), read_timeout)?;
    let mss = MediaSourceStream::new(
        Box::new(ReadOnlySource::new(reader)),
        MediaSourceStreamOptions::default(),
    );

    let mut hint = Hint::new();
    hint.with_extension("mp3");
    hint.mime_type("audio/mpeg");

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedFormat("no audio track".to_string()))?;
    let track_id = track.id;
    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let output = OutputDevice::open_default()?;
    let (sample_tx, sample_rx) = bounded::<Vec<f32>>(SAMPLE_QUEUE_CHUNKS);

    let error_reporter = reporter.clone();
    let stream = output.build_stream(sample_rx, Arc::clone(control), move |err| {
        error_reporter.fail(format!("Audio device error: {}", err));
    })?;
    stream.play()?;

    let mut rate = RateAdapter::new(output.sample_rate());

    while !control.is_stopped() {
        let packet = format.next_packet()?;
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(msg)) => {
                debug!(msg, "Skipping corrupt frame");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let source_rate = decoded.spec().rate;

        let stereo = rate.process(to_stereo_f32(decoded), source_rate)?;

        if stereo.is_empty() {
            continue;
        }

        let samples = map_channels(&stereo, output.channels());
        if !queue_samples(&sample_tx, samples, control) {
            break;
        }

        reporter.loaded();
    }

    drop(stream);
    Ok(())
}

/// Block until the callback has room; false once stopped
fn queue_samples(sender: &Sender<Vec<f32>>, samples: Vec<f32>, control: &StreamControl) -> bool {
    let mut pending = samples;
    loop {
        if control.is_stopped() {
            return false;
        }
        match sender.send_timeout(pending, STOP_POLL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => pending = returned,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
