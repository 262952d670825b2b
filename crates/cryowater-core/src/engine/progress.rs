#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards engine progress to an optional front-end callback.
///
/// The callback may be invoked concurrently from worker threads, hence the `Send + Sync`
/// bound; without a callback every report is a no-op.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `body` between a `PhaseStart`/`PhaseFinish` pair.
    ///
    /// `PhaseFinish` is reported even when `body` returns an error, so a front end never
    /// leaves a spinner running.
    pub fn phase<T>(&self, name: &'static str, body: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = body();
        self.report(Progress::PhaseFinish);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_reporter() -> (ProgressReporter<'static>, Arc<Mutex<Vec<String>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |p: Progress| {
            sink.lock().unwrap().push(format!("{:?}", p));
        }));
        (reporter, events)
    }

    #[test]
    fn reporter_without_callback_is_silent() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
        assert_eq!(reporter.phase("noop", || 7), 7);
    }

    #[test]
    fn phase_wraps_body_in_start_and_finish() {
        let (reporter, events) = recording_reporter();

        let value = reporter.phase("Seeding", || {
            reporter.report(Progress::TaskIncrement);
            42
        });

        assert_eq!(value, 42);
        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "PhaseStart { name: \"Seeding\" }".to_string(),
                "TaskIncrement".to_string(),
                "PhaseFinish".to_string(),
            ]
        );
    }

    #[test]
    fn phase_finishes_even_when_body_fails() {
        let (reporter, events) = recording_reporter();

        let result: Result<(), &str> = reporter.phase("Failing", || Err("boom"));

        assert!(result.is_err());
        assert_eq!(events.lock().unwrap().last().unwrap(), "PhaseFinish");
    }
}
