use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::{self, OpenOptions};
use std::io::{Error, ErrorKind};
use std::path::PathBuf;

pub fn init_logger() -> Result<(), Error> {
    // Get user's home directory and construct log path
    let home = std::env::var("HOME")
        .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not set"))?;

    let log_dir = PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("beatsyncrs")
        .join("logs");

    // Create the log directory if it doesn't exist
    fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("app.log"))?;

    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))
}
