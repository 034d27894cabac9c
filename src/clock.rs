//! Clock source: the single timing authority for a run.

use crate::beat::BeatSignal;
use crate::config::ClockConfig;
use crate::midi::MidiMessage;
use crate::sink::OutputSink;
use crate::state::{RunState, TickCounter};
use crate::transport::Fault;
use crossbeam::channel::Sender;
use log::{error, info, trace};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Emits one MIDI clock pulse per tick on every sink, raising the beat
/// signals every `pulses_per_beat`-th tick.
///
/// Timing uses a drift-corrected hybrid wait: tick n fires at
/// `epoch + n * tick_interval`, never at `previous + tick_interval`, so
/// scheduling error does not accumulate with the tick count. The thread
/// coarse-sleeps until shortly before the target, then spins the remainder.
pub struct ClockSource {
    config: ClockConfig,
    sinks: Vec<Arc<OutputSink>>,
    beat_signals: Vec<Arc<BeatSignal>>,
    ticks: TickCounter,
    run_state: RunState,
    faults: Sender<Fault>,
}

impl ClockSource {
    pub fn new(
        config: ClockConfig,
        sinks: Vec<Arc<OutputSink>>,
        beat_signals: Vec<Arc<BeatSignal>>,
        ticks: TickCounter,
        run_state: RunState,
        faults: Sender<Fault>,
    ) -> Self {
        Self {
            config,
            sinks,
            beat_signals,
            ticks,
            run_state,
            faults,
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || self.run())
    }

    fn run(self) {
        let tick_interval = self.config.tick_interval();
        // Coarse-sleep until within the spin margin of the target, in naps
        // of half the margin, then busy-wait the rest.
        let spin_margin = tick_interval.div_f64(1.5);
        let nap = spin_margin / 2;
        let pulses_per_beat = self.config.pulses_per_beat as u64;

        info!(
            "Clock started: {} BPM, {} PPQN, tick interval {:?}",
            self.config.bpm, self.config.pulses_per_beat, tick_interval
        );

        let epoch = Instant::now();
        let mut n: u64 = 0;

        while !self.run_state.is_stopping() {
            let target = epoch + tick_interval.mul_f64(n as f64);

            while Instant::now() + spin_margin < target {
                thread::sleep(nap);
            }
            while Instant::now() < target {
                std::hint::spin_loop();
            }

            // The pulse goes out on every sink before the beat is signaled.
            for sink in &self.sinks {
                if let Err(e) = sink.send(MidiMessage::Clock) {
                    error!("Clock pulse failed on sink '{}': {}", sink.name(), e);
                    let _ = self.faults.send(Fault::Clock(e));
                    return;
                }
            }

            let count = self.ticks.advance();
            if count % pulses_per_beat == 0 {
                trace!("Beat boundary at tick {}", count);
                for signal in &self.beat_signals {
                    signal.signal();
                }
            }

            n += 1;
        }

        info!("Clock stopped after {} ticks", self.ticks.value());
    }
}
