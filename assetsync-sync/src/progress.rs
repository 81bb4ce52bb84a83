//! Step progress reporting for downloads, commands and archive stages.

/// Receives step boundaries and byte counts.
pub trait Progress {
    fn start(&mut self, step: &str, total: Option<u64>);
    fn advance(&mut self, done: u64);
    fn finish(&mut self, step: &str, ok: bool);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&mut self, _step: &str, _total: Option<u64>) {}
    fn advance(&mut self, _done: u64) {}
    fn finish(&mut self, _step: &str, _ok: bool) {}
}

/// Logs step boundaries through `tracing`.
#[derive(Debug, Default)]
pub struct LogProgress {
    total: Option<u64>,
    done: u64,
}

impl Progress for LogProgress {
    fn start(&mut self, step: &str, total: Option<u64>) {
        self.total = total;
        self.done = 0;
        match total {
            Some(total) => tracing::info!("{step} ({total} bytes)"),
            None => tracing::info!("{step}"),
        }
    }

    fn advance(&mut self, done: u64) {
        self.done = done;
        tracing::trace!("{done}/{:?} bytes", self.total);
    }

    fn finish(&mut self, step: &str, ok: bool) {
        if ok {
            tracing::debug!("{step}: done");
        } else {
            tracing::warn!("{step}: failed after {} bytes", self.done);
        }
    }
}

/// Records events, for assertions.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingProgress {
    pub events: Vec<String>,
}

impl Progress for RecordingProgress {
    fn start(&mut self, step: &str, _total: Option<u64>) {
        self.events.push(format!("start:{step}"));
    }

    fn advance(&mut self, _done: u64) {}

    fn finish(&mut self, step: &str, ok: bool) {
        self.events.push(format!("{}:{step}", if ok { "ok" } else { "failed" }));
    }
}
