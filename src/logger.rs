//! Session log: every record goes to the console and is appended to the log file.

use crate::Error;
use chrono::{DateTime, Local};
use env_logger::{Builder, Env, Target};
use log::{Level, LevelFilter};
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE: &str = "==================================================";

/// Target for records the user must see to finish signing in, enabled whatever `RUST_LOG` says.
pub const SIGN_IN_TARGET: &str = "sign_in";

pub fn format_line(timestamp: &DateTime<Local>, level: Level, message: impl Display) -> String {
    format!(
        "{} [{}] - {}",
        timestamp.format(TIMESTAMP_FORMAT),
        level,
        message
    )
}

/// Session-start banner, bracketed by blank lines.
pub fn write_banner<W: Write>(out: &mut W, now: &DateTime<Local>) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}", format_line(now, Level::Info, "Session started"))?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)
}

/// Writer duplicating everything to the console and a file.
///
/// A failing console never loses a line in the file.
pub struct Tee<C: Write, F: Write> {
    console: C,
    file: F,
}

impl<C: Write, F: Write> Tee<C, F> {
    pub fn new(console: C, file: F) -> Self {
        Tee { console, file }
    }
}

impl<C: Write, F: Write> Write for Tee<C, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.console.write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

fn builder(env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env);
    builder.filter_module(SIGN_IN_TARGET, LevelFilter::Info);
    builder
}

/// Open (or create) `log_path` for appending, write the session banner and install the process
/// logger. `RUST_LOG` overrides the default `info` filter.
pub fn init(log_path: &Path) -> Result<(), Error> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| {
            Error::Configuration(format!(
                "cannot open log file {}: {}",
                log_path.display(),
                e
            ))
        })?;

    let mut tee = Tee::new(io::stdout(), file);
    write_banner(&mut tee, &Local::now()).map_err(|e| {
        Error::Configuration(format!(
            "cannot write to log file {}: {}",
            log_path.display(),
            e
        ))
    })?;

    builder(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}",
                format_line(&Local::now(), record.level(), record.args())
            )
        })
        .target(Target::Pipe(Box::new(tee)))
        .try_init()
        .map_err(|e| Error::Configuration(e.to_string()))
}
