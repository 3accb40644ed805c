#![allow(dead_code)] // not every helper is used by every test module

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::{Mutex, Once};

use crate::data::DataContext;
use crate::process::{Algorithm, Status};

/// Initialises the logger once for the whole test binary.
pub(crate) fn init() {
    static SET_LOGGER_ONCE: Once = Once::new();
    SET_LOGGER_ONCE.call_once(env_logger::init);
}

/// Records named events in observation order.
#[derive(Default)]
pub(crate) struct Recorder {
    events: Mutex<Vec<(String, i64)>>,
}

impl Recorder {
    pub(crate) fn record(&self, key: &str, value: i64) {
        self.events.lock().push((key.to_owned(), value));
    }

    /// The position of the first event with `key`, if any.
    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.events.lock().iter().position(|(event, _)| event == key)
    }

    pub(crate) fn has_key(&self, key: &str) -> bool { self.position(key).is_some() }

    pub(crate) fn has_value(&self, key: &str, value: i64) -> bool {
        self.events.lock().iter().any(|(event, v)| event == key && *v == value)
    }

    pub(crate) fn len(&self) -> usize { self.events.lock().len() }
}

/// Sleeps for a fixed delay, records its name, then returns its status.
pub(crate) struct DelayAlgo {
    name:     &'static str,
    delay:    Duration,
    status:   Status,
    recorder: Arc<Recorder>,
}

impl DelayAlgo {
    pub(crate) fn new(name: &'static str, delay_ms: u64, recorder: &Arc<Recorder>) -> Self {
        Self {
            name,
            delay: Duration::from_millis(delay_ms),
            status: Status::Ok,
            recorder: Arc::clone(recorder),
        }
    }

    pub(crate) fn failing(name: &'static str, delay_ms: u64, recorder: &Arc<Recorder>) -> Self {
        Self { status: Status::Error, ..Self::new(name, delay_ms, recorder) }
    }
}

impl Algorithm for DelayAlgo {
    fn execute(&mut self, _data: &DataContext) -> Status {
        thread::sleep(self.delay);
        self.recorder.record(self.name, 0);
        self.status
    }
}
