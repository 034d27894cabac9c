pub mod beat;
pub mod cli;
pub mod clock;
pub mod config;
pub mod generator;
pub mod logging;
pub mod midi;
pub mod sink;
pub mod state;
pub mod stream;
pub mod transport;
