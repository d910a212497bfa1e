//! Injected logger handle.
//!
//! Components receive a [`Logger`] at construction time instead of reaching for
//! a process-wide logger. The sink is any [`log::Log`] implementation; in the
//! binary it is an `env_logger` instance filtered through `RUST_LOG`.

use log::{Level, Log, Metadata, Record};
use std::fmt;
use std::sync::Arc;

const DEFAULT_TARGET: &str = "ingredient_recognition";

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    target: &'static str,
}

impl Logger {
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Logger {
            sink,
            target: DEFAULT_TARGET,
        }
    }

    /// Build a logger backed by `env_logger`, honouring `RUST_LOG` (default `info`)
    pub fn from_env() -> Self {
        let sink = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .build();
        Self::new(Arc::new(sink))
    }

    /// A logger that drops every record
    pub fn discard() -> Self {
        Self::new(Arc::new(Discard))
    }

    /// Same sink, records tagged with the given component target
    pub fn scoped(&self, target: &'static str) -> Self {
        Logger {
            sink: Arc::clone(&self.sink),
            target,
        }
    }

    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(self.target).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path_static(Some(self.target))
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn flush(&self) {
        self.sink.flush();
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("target", &self.target).finish()
    }
}

struct Discard;

impl Log for Discard {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _: &Record<'_>) {}

    fn flush(&self) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Sink that keeps every record so tests can assert on them
    #[derive(Default)]
    pub struct Capture {
        pub records: Mutex<Vec<(Level, String, String)>>,
    }

    impl Capture {
        pub fn lines(&self, level: Level) -> Vec<String> {
            self.records
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _, _)| *l == level)
                .map(|(_, _, msg)| msg.clone())
                .collect()
        }
    }

    impl Log for Capture {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            self.records.lock().unwrap().push((
                record.level(),
                record.target().to_string(),
                record.args().to_string(),
            ));
        }

        fn flush(&self) {}
    }
}
