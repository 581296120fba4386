use std::{fs::OpenOptions, io::Write, path::Path, sync::Mutex};

use crate::trace::trace::TraceEvent;

/// Append-only JSONL sink for `TraceEvent`s. Shared across worker
/// completions; every failure degrades to a warning.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    pub fn open(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path);

        match file {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                log::warn!("could not open trace file '{}': {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn record(&self, event: &TraceEvent) {
        let Some(file_mutex) = &self.file else { return };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                log::warn!("failed to serialize trace event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                log::warn!("trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            log::warn!("failed to write trace event: {}", e);
        }
    }
}
