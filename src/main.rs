use beatsyncrs::{
    cli::{validate_port, Args},
    config::{ClockConfig, StreamConfig, Voice, TICKS_PER_BEAT},
    generator::{ScaleWalk, WeightedRhythm},
    logging,
    midi::DefaultMidiEngine,
    transport::{TransportController, VoiceSpec},
};
use clap::Parser;

fn main() {
    initialize_logging();
    let args = Args::parse();
    let ports = DefaultMidiEngine::list_ports();

    if args.device_list {
        list_available_ports(&ports);
        return;
    }

    if args.ports.is_empty() {
        fail("Error: at least one --port is required (try --device-list)");
    }
    if args.bpm <= 0.0 {
        fail(&format!("Error: BPM must be positive, got {}", args.bpm));
    }
    if args.factor <= 0.0 {
        fail(&format!("Error: factor must be positive, got {}", args.factor));
    }
    for port_name in &args.ports {
        if let Err(error_msg) = validate_port(port_name, &ports) {
            fail(&error_msg);
        }
    }

    let mut transport = TransportController::new(ClockConfig::new(args.bpm, TICKS_PER_BEAT));
    let voices = open_sinks_and_voices(&mut transport, &args);

    install_interrupt_handler(&transport);

    if let Err(e) = transport.start(voices) {
        fail(&format!("Error starting transport: {}", e));
    }

    log::info!("Sequencer running at {} BPM. Press Ctrl+C to stop...", args.bpm);
    println!("Sequencer running at {} BPM. Press Ctrl+C to stop...", args.bpm);

    transport.run(args.run_beats);
    println!("\nAll threads stopped.");
}

fn initialize_logging() {
    if let Err(e) = logging::init_logger() {
        eprintln!("Logger initialization failed: {}", e);
        std::process::exit(1);
    }
    log::info!("Application starting");
}

fn list_available_ports(ports: &[String]) {
    println!("Available MIDI output ports:");
    for port in ports {
        println!("  - {}", port);
    }
}

/// One voice per requested port: the first is the lead, later ports play
/// an octave down as accompaniment, each on its own channel.
fn open_sinks_and_voices(transport: &mut TransportController, args: &Args) -> Vec<VoiceSpec> {
    let mut voices = Vec::with_capacity(args.ports.len());

    for (i, port_name) in args.ports.iter().enumerate() {
        let engine = match DefaultMidiEngine::new(port_name) {
            Ok(engine) => {
                log::info!("Connected to MIDI output: {}", port_name);
                println!("Connected to MIDI output: {}", port_name);
                engine
            }
            Err(e) => {
                fail(&format!("Error connecting to '{}': {}", port_name, e));
            }
        };
        let sink = transport.add_sink(port_name, Box::new(engine));

        let mut voice = Voice::new(i as u8);
        if i > 0 {
            voice.octave_shift = -1;
        }
        voices.push(VoiceSpec {
            voice,
            sink,
            config: StreamConfig {
                factor: args.factor,
                ..StreamConfig::default()
            },
            phrases: Box::new(ScaleWalk::a_minor_pentatonic()),
            rhythm: Box::new(WeightedRhythm::default()),
        });
    }

    voices
}

fn install_interrupt_handler(transport: &TransportController) {
    let stopper = transport.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        stopper.request_stop();
    }) {
        fail(&format!("Error installing interrupt handler: {}", e));
    }
}

fn fail(error_msg: &str) -> ! {
    log::error!("{}", error_msg);
    eprintln!("{}", error_msg);
    std::process::exit(1);
}
