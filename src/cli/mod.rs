use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI output ports
    #[arg(long)]
    pub device_list: bool,

    /// MIDI output port name; repeat for additional voices
    #[arg(long = "port")]
    pub ports: Vec<String>,

    /// Beats per minute for the clock
    #[arg(long, default_value_t = 120.0)]
    pub bpm: f64,

    /// Seconds of hold time per beat-fraction of note duration
    #[arg(long, default_value_t = 1.0)]
    pub factor: f64,

    /// Stop automatically after this many beats
    #[arg(long)]
    pub run_beats: Option<u64>,
}

pub fn validate_port(port_name: &str, ports: &[String]) -> Result<(), String> {
    if !ports.iter().any(|p| p.contains(port_name)) {
        let mut error_msg = format!("Error: Port '{}' not found in available ports:\n", port_name);
        for port in ports {
            error_msg.push_str(&format!("  - {}\n", port));
        }
        return Err(error_msg);
    }
    Ok(())
}
