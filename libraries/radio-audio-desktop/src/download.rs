//! HTTP stream download
//!
//! A background thread with its own tokio runtime pulls the live MP3 body
//! chunk by chunk and hands the bytes to the decoder through a bounded
//! channel. `ChannelReader` turns that channel back into a blocking
//! `std::io::Read` for symphonia.

use crate::error::AudioError;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::future::Future;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Chunks buffered between the download and decoder threads
const BUFFER_CHUNKS: usize = 64;

/// How often a blocked reader or request re-checks the stop flag
const STOP_POLL: Duration = Duration::from_millis(100);

/// Limit on establishing the TCP/TLS connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest wait for response headers or the next body chunk
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Message from the download thread
#[derive(Debug)]
pub enum DownloadChunk {
    Data(Vec<u8>),
    Failed(String),
}

/// Start downloading `url` on a background thread
///
/// The thread stops when `stop` is set, the body ends, the reader is
/// dropped, or the server goes silent for longer than `read_timeout`.
pub fn spawn_download(
    url: String,
    stop: Arc<AtomicBool>,
    read_timeout: Duration,
) -> Result<ChannelReader, AudioError> {
    let (sender, receiver) = bounded(BUFFER_CHUNKS);
    let thread_stop = Arc::clone(&stop);

    thread::Builder::new()
        .name("radio-download".to_string())
        .spawn(move || download_stream(&url, &sender, &thread_stop, read_timeout))?;

    Ok(ChannelReader::new(receiver, stop))
}

fn download_stream(
    url: &str,
    sender: &Sender<DownloadChunk>,
    stop: &AtomicBool,
    read_timeout: Duration,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            let _ = sender.send(DownloadChunk::Failed(format!(
                "Failed to create runtime: {}",
                e
            )));
            return;
        }
    };

    let result = runtime.block_on(download_stream_async(url, sender, stop, read_timeout));
    if let Err(e) = result {
        warn!(error = %e, "Stream download failed");
        let _ = sender.send(DownloadChunk::Failed(e.to_string()));
    }
}

async fn download_stream_async(
    url: &str,
    sender: &Sender<DownloadChunk>,
    stop: &AtomicBool,
    read_timeout: Duration,
) -> Result<(), AudioError> {
    let client = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(format!("KrushiRadio/{} (Desktop)", env!("CARGO_PKG_VERSION")))
        .build()?;

    let Some(mut response) = until_stopped(client.get(url).send(), stop, read_timeout).await?
    else {
        return Ok(());
    };

    if !response.status().is_success() {
        return Err(AudioError::Http(response.status().as_u16()));
    }

    debug!(url, "Stream connected");

    loop {
        let Some(next) = until_stopped(response.chunk(), stop, read_timeout).await? else {
            return Ok(());
        };

        match next {
            Some(chunk) if chunk.is_empty() => {}
            Some(chunk) => {
                if !forward(sender, chunk.to_vec(), stop) {
                    return Ok(());
                }
            }
            None => {
                return Err(AudioError::Network("stream ended by server".to_string()));
            }
        }
    }
}

/// Queue bytes for the reader; false once stopped or the reader is gone
fn forward(sender: &Sender<DownloadChunk>, data: Vec<u8>, stop: &AtomicBool) -> bool {
    let mut pending = DownloadChunk::Data(data);
    loop {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        match sender.send_timeout(pending, STOP_POLL) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => pending = returned,
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}

/// Await `request` while watching the stop flag
///
/// Returns `Ok(None)` once stopped. Dropping the request on stop releases
/// the connection.
async fn until_stopped<F, T>(
    request: F,
    stop: &AtomicBool,
    limit: Duration,
) -> Result<Option<T>, AudioError>
where
    F: Future<Output = Result<T, reqwest::Error>>,
{
    tokio::pin!(request);
    let deadline = tokio::time::Instant::now() + limit;

    loop {
        if stop.load(Ordering::Relaxed) {
            return Ok(None);
        }

        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Err(AudioError::Network("read timeout".to_string()));
        }

        if let Ok(result) = tokio::time::timeout(remaining.min(STOP_POLL), &mut request).await {
            return Ok(Some(result?));
        }
    }
}

/// Blocking reader over downloaded chunks
pub struct ChannelReader {
    receiver: Receiver<DownloadChunk>,
    stop: Arc<AtomicBool>,
    current: Vec<u8>,
    offset: usize,
}

impl ChannelReader {
    pub fn new(receiver: Receiver<DownloadChunk>, stop: Arc<AtomicBool>) -> Self {
        Self {
            receiver,
            stop,
            current: Vec::new(),
            offset: 0,
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        while self.offset >= self.current.len() {
            if self.stop.load(Ordering::Relaxed) {
                return Err(io::Error::new(io::ErrorKind::ConnectionAborted, "stream closed"));
            }

            match self.receiver.recv_timeout(STOP_POLL) {
                Ok(DownloadChunk::Data(data)) => {
                    self.current = data;
                    self.offset = 0;
                }
                Ok(DownloadChunk::Failed(message)) => {
                    return Err(io::Error::other(message));
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }

        let available = &self.current[self.offset..];
        let len = available.len().min(buf.len());
        buf[..len].copy_from_slice(&available[..len]);
        self.offset += len;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader() -> (Sender<DownloadChunk>, ChannelReader, Arc<AtomicBool>) {
        let (tx, rx) = bounded(8);
        let stop = Arc::new(AtomicBool::new(false));
        (tx, ChannelReader::new(rx, stop.clone()), stop)
    }

    #[test]
    fn reads_across_chunks() {
        let (tx, mut reader, _) = reader();
        tx.send(DownloadChunk::Data(vec![1, 2, 3])).unwrap();
        tx.send(DownloadChunk::Data(vec![4, 5])).unwrap();
        drop(tx);

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn small_buffer_reads_partially() {
        let (tx, mut reader, _) = reader();
        tx.send(DownloadChunk::Data(vec![1, 2, 3, 4])).unwrap();

        let mut buf = [0u8; 3];
        assert_eq!(reader.read(&mut buf).unwrap(), 3);
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 4);
    }

    #[test]
    fn download_failure_surfaces_as_io_error() {
        let (tx, mut reader, _) = reader();
        tx.send(DownloadChunk::Failed("network: connection reset".to_string()))
            .unwrap();

        let err = reader.read(&mut [0u8; 16]).unwrap_err();
        assert!(err.to_string().contains("network"));
    }

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn silent_request_times_out_as_network_error() {
        let stop = AtomicBool::new(false);
        let pending = std::future::pending::<Result<(), reqwest::Error>>();

        let err = block_on(until_stopped(pending, &stop, Duration::from_secs(15))).unwrap_err();
        assert_eq!(err.to_string(), "network: read timeout");
        assert!(radio_playback::StreamFault::new(err.to_string()).is_connectivity_related());
    }

    #[test]
    fn stopped_request_is_abandoned() {
        let stop = AtomicBool::new(true);
        let pending = std::future::pending::<Result<(), reqwest::Error>>();

        let outcome = block_on(until_stopped(pending, &stop, Duration::from_secs(15))).unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn ready_request_passes_through() {
        let stop = AtomicBool::new(false);
        let ready = async { Ok::<_, reqwest::Error>(7) };

        let outcome = block_on(until_stopped(ready, &stop, Duration::from_secs(15))).unwrap();
        assert_eq!(outcome, Some(7));
    }

    #[test]
    fn full_queue_gives_up_when_stopped() {
        let (tx, _rx) = bounded(1);
        let stop = AtomicBool::new(false);
        assert!(forward(&tx, vec![1], &stop));

        stop.store(true, Ordering::Relaxed);
        assert!(!forward(&tx, vec![2], &stop));
    }

    #[test]
    fn stop_flag_unblocks_reader() {
        let (_tx, mut reader, stop) = reader();
        stop.store(true, Ordering::Relaxed);

        let err = reader.read(&mut [0u8; 16]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionAborted);
    }
}
