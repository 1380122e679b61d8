//! Interactive `listen` command
//!
//! Wires the desktop audio platform and a TCP reachability probe into a
//! session, prints every snapshot change and forwards key presses as
//! intents until the listener quits.

use crate::config::PlayerConfig;
use crate::display::{render_snapshot, render_station, Key};
use radio_audio_desktop::DesktopAudioPlatform;
use radio_connectivity::{ConnectivityMonitor, TcpProbe};
use radio_playback::station::station_info;
use radio_playback::{SessionConfig, SessionRuntime};
use std::io::BufRead;
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn run(config: &PlayerConfig) -> anyhow::Result<()> {
    let probe = TcpProbe::new(
        config.connectivity.probe_address.clone(),
        config.connectivity.probe_timeout(),
    );
    let (connectivity, monitor) = ConnectivityMonitor::new(probe).spawn();

    let session = SessionRuntime::spawn(
        SessionConfig {
            initial_volume: config.player.initial_volume,
        },
        Box::new(DesktopAudioPlatform::new()),
        connectivity,
    );
    let mut snapshots = session.subscribe();
    let mut keys = spawn_stdin_reader();
    let mut stdin_open = true;

    println!("{}\n", render_station(&station_info()));
    println!("[p] play/pause  [+/-] volume  [q] quit\n");
    println!("{}", render_snapshot(&snapshots.borrow_and_update()));

    let autoplay = tokio::time::sleep(config.player.launch_delay());
    tokio::pin!(autoplay);
    let mut autoplay_pending = config.player.autoplay;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            () = &mut autoplay, if autoplay_pending => {
                autoplay_pending = false;
                info!("Auto-starting stream");
                session.start()?;
            }
            line = keys.recv(), if stdin_open => {
                let Some(line) = line else {
                    // Keep playing until Ctrl-C
                    debug!("stdin closed");
                    stdin_open = false;
                    continue;
                };
                match Key::parse(&line) {
                    Some(Key::Quit) => break,
                    Some(key) => {
                        if let Some(intent) = key.intent() {
                            autoplay_pending = false;
                            session.send(intent)?;
                        }
                    }
                    None => {}
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("Session stopped unexpectedly");
                    break;
                }
                println!("{}", render_snapshot(&snapshots.borrow_and_update()));
            }
            _ = &mut ctrl_c => break,
        }
    }

    info!("Shutting down");
    session.shutdown().await?;
    monitor.abort();
    Ok(())
}

/// Forward stdin lines from a detached thread
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    let spawned = thread::Builder::new()
        .name("radio-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

    if let Err(e) = spawned {
        warn!(error = %e, "Keyboard input unavailable");
    }

    rx
}
