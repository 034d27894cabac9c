//! Transport controller: owns the lifecycle of every thread in a run.
//!
//! Startup opens the sinks and sends transport-start, then spawns the clock
//! source and one worker stream per voice. Shutdown raises cancellation,
//! joins every thread with a bounded wait, then sends transport-stop plus an
//! all-notes-off sweep over every channel that actually sounded.

use crate::beat::BeatSignal;
use crate::clock::ClockSource;
use crate::config::{ClockConfig, StreamConfig, Voice};
use crate::generator::{MotifGenerator, PhraseGenerator};
use crate::midi::{self, MidiError, MidiMessage, ALL_NOTES_OFF};
use crate::sink::OutputSink;
use crate::state::{RunState, TickCounter};
use crate::stream::WorkerStream;
use crossbeam::channel::{unbounded, Receiver, Sender};
use crossbeam::select;
use log::{error, info, warn};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How long shutdown waits for any one thread before abandoning it.
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A runtime failure reported by the clock or a worker stream.
///
/// Clock faults are fatal to the whole run; a voice fault only marks that
/// voice dead while the rest of the run continues.
#[derive(Debug)]
pub enum Fault {
    Clock(MidiError),
    Voice { channel: u8, error: MidiError },
}

/// Everything needed to spawn one worker stream.
pub struct VoiceSpec {
    pub voice: Voice,
    /// Index of the sink (from [`TransportController::add_sink`]) to play on.
    pub sink: usize,
    pub config: StreamConfig,
    pub phrases: Box<dyn PhraseGenerator>,
    pub rhythm: Box<dyn MotifGenerator>,
}

/// Cloneable handle for requesting a stop from another thread, such as a
/// SIGINT handler.
#[derive(Clone)]
pub struct StopHandle {
    tx: Sender<()>,
}

impl StopHandle {
    pub fn request_stop(&self) {
        let _ = self.tx.send(());
    }
}

pub struct TransportController {
    clock_config: ClockConfig,
    sinks: Vec<Arc<OutputSink>>,
    run_state: RunState,
    ticks: TickCounter,
    handles: Vec<JoinHandle<()>>,
    fault_tx: Sender<Fault>,
    fault_rx: Receiver<Fault>,
    stop_tx: Sender<()>,
    stop_rx: Receiver<()>,
    shutdown_done: bool,
}

impl TransportController {
    pub fn new(clock_config: ClockConfig) -> Self {
        let (fault_tx, fault_rx) = unbounded();
        let (stop_tx, stop_rx) = unbounded();
        Self {
            clock_config,
            sinks: Vec::new(),
            run_state: RunState::new(),
            ticks: TickCounter::new(),
            handles: Vec::new(),
            fault_tx,
            fault_rx,
            stop_tx,
            stop_rx,
            shutdown_done: false,
        }
    }

    /// Registers an opened device connection; returns its sink index for
    /// use in [`VoiceSpec::sink`].
    pub fn add_sink(&mut self, name: &str, engine: Box<dyn midi::MidiEngine>) -> usize {
        self.sinks.push(Arc::new(OutputSink::new(name, engine)));
        self.sinks.len() - 1
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    pub fn ticks(&self) -> TickCounter {
        self.ticks.clone()
    }

    /// Sends transport-start on every sink and spawns the clock source plus
    /// one worker stream per voice. A failure here aborts before any thread
    /// is spawned.
    pub fn start(&mut self, voices: Vec<VoiceSpec>) -> midi::Result<()> {
        for sink in &self.sinks {
            sink.send(MidiMessage::Start)?;
        }

        let mut beat_signals = Vec::with_capacity(voices.len());
        let mut workers = Vec::with_capacity(voices.len());
        for spec in voices {
            let beat = Arc::new(BeatSignal::new());
            beat_signals.push(Arc::clone(&beat));
            workers.push(WorkerStream::new(
                spec.voice,
                spec.config,
                Arc::clone(&self.sinks[spec.sink]),
                beat,
                spec.phrases,
                spec.rhythm,
                self.run_state.clone(),
                self.fault_tx.clone(),
            ));
        }

        let clock = ClockSource::new(
            self.clock_config,
            self.sinks.clone(),
            beat_signals,
            self.ticks.clone(),
            self.run_state.clone(),
            self.fault_tx.clone(),
        );

        for worker in workers {
            self.handles.push(worker.spawn());
        }
        self.handles.push(clock.spawn());

        info!(
            "Transport started: {} sink(s), {} thread(s)",
            self.sinks.len(),
            self.handles.len()
        );
        Ok(())
    }

    /// Blocks until a stop is requested, the clock faults, or the optional
    /// beat bound elapses, then performs the shutdown sequence.
    pub fn run(&mut self, run_beats: Option<u64>) {
        let tick_bound = run_beats.map(|b| b * self.clock_config.pulses_per_beat as u64);

        loop {
            select! {
                recv(self.stop_rx) -> _ => {
                    info!("Stop requested");
                    break;
                }
                recv(self.fault_rx) -> fault => {
                    match fault {
                        Ok(Fault::Clock(e)) => {
                            error!("Clock fault, stopping run: {}", e);
                            break;
                        }
                        Ok(Fault::Voice { channel, error }) => {
                            // Isolated to that voice; the run continues.
                            warn!("Voice on channel {} went silent: {}", channel, error);
                        }
                        Err(_) => break,
                    }
                }
                default(Duration::from_millis(25)) => {
                    if let Some(bound) = tick_bound {
                        if self.ticks.value() >= bound {
                            info!("Beat bound reached");
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown();
    }

    /// Stops every thread and silences every used channel. Safe to call
    /// more than once; only the first call sends anything.
    pub fn shutdown(&mut self) {
        if self.shutdown_done {
            return;
        }
        self.shutdown_done = true;

        info!("Signaling threads to stop");
        self.run_state.request_stop();

        for handle in self.handles.drain(..) {
            let deadline = Instant::now() + JOIN_TIMEOUT;
            while !handle.is_finished() && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(10));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                // Proceed to cleanup rather than hang on a stuck thread.
                warn!("A thread did not stop within {:?}, abandoning it", JOIN_TIMEOUT);
            }
        }

        // Transport-stop, then guaranteed silence on every channel that
        // carried a note during the run.
        for sink in &self.sinks {
            if let Err(e) = sink.send(MidiMessage::Stop) {
                error!("Failed to send stop on sink '{}': {}", sink.name(), e);
            }
            for channel in sink.used_channels() {
                if let Err(e) = sink.send(MidiMessage::ControlChange {
                    channel,
                    controller: ALL_NOTES_OFF,
                    value: 0,
                }) {
                    error!(
                        "All-notes-off failed on sink '{}' channel {}: {}",
                        sink.name(),
                        channel,
                        e
                    );
                }
            }
        }

        info!("All threads stopped, transport closed");
    }
}

impl Drop for TransportController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
