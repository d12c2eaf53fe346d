//! Runtime settings, all taken from the environment.
//!
//! - `TAG_AUDIT_DIR`: notes directory (default `~/.tag_audit`)
//! - `NO_COLOR`: disable ANSI styling
//! - `TAG_AUDIT_THEME`: `light` or `dark` chip palette (default `dark`)
//! - `COLUMNS`: canvas width when stdout is not a terminal (default 80)
//! - `TAG_AUDIT_LOG`: tracing filter (default `warn`)

use crate::formatting::{FormatContext, Theme};
use std::env;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_COLUMNS: u32 = 80;

#[derive(Debug, Clone)]
pub struct Settings {
    pub notes_dir: PathBuf,
    pub use_color: bool,
    pub theme: Theme,
    pub columns: u32,
}

impl Settings {
    pub fn from_env() -> io::Result<Self> {
        let theme = env::var("TAG_AUDIT_THEME")
            .ok()
            .and_then(|v| Theme::parse(&v))
            .unwrap_or(Theme::Dark);
        Ok(Self {
            notes_dir: notes_dir()?,
            use_color: env::var("NO_COLOR").is_err(),
            theme,
            columns: terminal_columns(),
        })
    }

    pub fn format_context(&self) -> FormatContext {
        FormatContext::new(self.use_color, self.theme)
    }
}

pub fn notes_dir() -> io::Result<PathBuf> {
    if let Ok(dir) = env::var("TAG_AUDIT_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = env::var("HOME").map_err(|_| {
        io::Error::other("HOME not set; set TAG_AUDIT_DIR explicitly")
    })?;
    Ok(PathBuf::from(home).join(".tag_audit"))
}

/// Width of the attached terminal, else `COLUMNS`, else 80.
pub fn terminal_columns() -> u32 {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size()
    {
        return u32::from(w);
    }
    env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|w| *w > 0)
        .unwrap_or(DEFAULT_COLUMNS)
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_tracing(use_color: bool) {
    let filter = EnvFilter::try_from_env("TAG_AUDIT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .try_init();
}
