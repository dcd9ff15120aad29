//! Acquisition service — one read request, end to end.
//!
//! ```text
//!  ReadRequest ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  (FIFO queue)    │     AcquisitionService      │
//!     PinPort ◀────│  sequencer · classifier     │
//!                  └────────────────────────────┘
//! ```
//!
//! Requests queue through a channel and are serviced strictly one at a
//! time: each request gets one dedicated rotation, the rotation's committed
//! triplet is classified against the request's reference table, and the
//! request's continuation fires exactly once with the outcome.  A request
//! arriving mid-rotation simply waits for the next one; there is no
//! cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use log::{debug, info};

use crate::config::SystemConfig;
use crate::events::ReadKind;
use crate::reference::ReferenceTable;
use crate::sensor::{classify, ChannelSequencer, ReadingCell};

use super::events::{AppEvent, ReadOutcome};
use super::ports::{ClockPort, EventSink, PinPort};

/// How long the service waits for a request before re-checking shutdown.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Continuation invoked with the outcome of a serviced request.
pub type ResultFn = Box<dyn FnOnce(ReadOutcome) + Send>;

/// A queued unit of work: which table to classify against and where the
/// result goes.
pub struct ReadRequest {
    pub kind: ReadKind,
    pub on_result: ResultFn,
}

impl ReadRequest {
    pub fn new(kind: ReadKind, on_result: impl FnOnce(ReadOutcome) + Send + 'static) -> Self {
        Self {
            kind,
            on_result: Box::new(on_result),
        }
    }
}

/// Cheap, cloneable handle for enqueueing read requests from any thread.
#[derive(Clone)]
pub struct SensorHandle {
    tx: Sender<ReadRequest>,
}

impl SensorHandle {
    /// Queue a reading.  Returns `false` if the service has shut down.
    pub fn request_reading(
        &self,
        kind: ReadKind,
        on_result: impl FnOnce(ReadOutcome) + Send + 'static,
    ) -> bool {
        let accepted = self.tx.send(ReadRequest::new(kind, on_result)).is_ok();
        debug!("read request ({kind}) accepted={accepted}");
        accepted
    }
}

/// Orchestrates the sequencer and classifier over the request queue.
pub struct AcquisitionService {
    sequencer: ChannelSequencer,
    committed: Arc<ReadingCell>,
    narrow: ReferenceTable,
    wide: ReferenceTable,
    rx: Receiver<ReadRequest>,
}

impl AcquisitionService {
    /// Build the service and its request handle.
    pub fn new(
        config: &SystemConfig,
        committed: Arc<ReadingCell>,
        narrow: ReferenceTable,
        wide: ReferenceTable,
    ) -> (Self, SensorHandle) {
        let (tx, rx) = unbounded();
        let service = Self {
            sequencer: ChannelSequencer::new(config),
            committed,
            narrow,
            wide,
            rx,
        };
        (service, SensorHandle { tx })
    }

    /// Runtime configuration surface (sample size, interval, divider).
    pub fn sequencer(&mut self) -> &mut ChannelSequencer {
        &mut self.sequencer
    }

    /// Service requests until `shutdown` is set or every handle is gone.
    ///
    /// Runs on the sequencing thread; all its sleeps happen here.
    pub fn run(
        &mut self,
        pins: &mut impl PinPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
        shutdown: &AtomicBool,
    ) {
        self.sequencer.initialise(pins);
        sink.emit(&AppEvent::Started);
        info!("acquisition service started");

        while !shutdown.load(Ordering::Relaxed) {
            match self.rx.recv_timeout(IDLE_POLL) {
                Ok(request) => self.service_one(request, pins, clock, sink),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("acquisition service stopping");
    }

    /// Service a single request: one rotation, one classification, one
    /// continuation call.
    pub fn service_one(
        &mut self,
        request: ReadRequest,
        pins: &mut impl PinPort,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) {
        let kind = request.kind;
        sink.emit(&AppEvent::ReadingStarted(kind));

        let sample = self
            .sequencer
            .run_rotation(pins, clock, &self.committed);

        let table = match kind {
            ReadKind::Narrow => &self.narrow,
            ReadKind::Wide => &self.wide,
        };
        let outcome = match classify(&sample, table) {
            Some(m) => ReadOutcome::Match {
                label: m.label.to_owned(),
                angle: m.angle,
            },
            None => ReadOutcome::NoSample,
        };

        info!(
            "read pH({:?}) from {kind} table, sample Hz {:?}",
            outcome.label(),
            sample.hertz
        );
        sink.emit(&AppEvent::ReadingCompleted {
            kind,
            outcome: outcome.clone(),
        });
        (request.on_result)(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::{Level, Line};
    use crate::reference::ReferenceEntry;
    use std::cell::Cell;
    use std::sync::Mutex;

    struct NullPins;

    impl PinPort for NullPins {
        fn set_line(&mut self, _line: Line, _level: Level) {}
    }

    #[derive(Default)]
    struct TestClock {
        now_us: Cell<u64>,
    }

    impl ClockPort for TestClock {
        fn now(&self) -> Duration {
            Duration::from_micros(self.now_us.get())
        }

        fn sleep(&self, dur: Duration) {
            self.now_us.set(self.now_us.get() + dur.as_micros() as u64);
        }
    }

    #[derive(Default)]
    struct CaptureSink {
        events: Vec<AppEvent>,
    }

    impl EventSink for CaptureSink {
        fn emit(&mut self, event: &AppEvent) {
            self.events.push(event.clone());
        }
    }

    fn one_row_table(label: &str) -> ReferenceTable {
        ReferenceTable::from_entries(vec![ReferenceEntry {
            label: label.to_owned(),
            rgb: [100.0, 200.0, 300.0],
        }])
    }

    fn service() -> (AcquisitionService, SensorHandle, Arc<ReadingCell>) {
        let committed = Arc::new(ReadingCell::new());
        let (service, handle) = AcquisitionService::new(
            &SystemConfig::default(),
            Arc::clone(&committed),
            one_row_table("narrow-ph"),
            one_row_table("wide-ph"),
        );
        (service, handle, committed)
    }

    #[test]
    fn silent_sensor_reports_no_sample() {
        let (mut service, _handle, _cell) = service();
        let outcome = Arc::new(Mutex::new(None));
        let sink_outcome = Arc::clone(&outcome);
        let request = ReadRequest::new(ReadKind::Narrow, move |o| {
            *sink_outcome.lock().unwrap() = Some(o);
        });

        let mut sink = CaptureSink::default();
        service.service_one(request, &mut NullPins, &TestClock::default(), &mut sink);

        assert_eq!(outcome.lock().unwrap().clone(), Some(ReadOutcome::NoSample));
    }

    #[test]
    fn committed_sample_classifies_against_the_requested_table() {
        let (mut service, _handle, cell) = service();
        // A triplet proportional to the table row: exact angular match.
        cell.publish(&crate::sensor::ChannelReading {
            hertz: [200.0, 400.0, 600.0],
            tally: [20, 20, 20],
        });

        let outcome = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&outcome);
        let request = ReadRequest::new(ReadKind::Wide, move |o| {
            *captured.lock().unwrap() = Some(o);
        });

        let mut sink = CaptureSink::default();
        service.service_one(request, &mut NullPins, &TestClock::default(), &mut sink);

        match outcome.lock().unwrap().clone() {
            Some(ReadOutcome::Match { label, angle }) => {
                assert_eq!(label, "wide-ph");
                assert!(angle < 1e-6);
            }
            other => panic!("expected a match, got {other:?}"),
        }
    }

    #[test]
    fn events_bracket_each_serviced_request() {
        let (mut service, _handle, _cell) = service();
        let mut sink = CaptureSink::default();
        let request = ReadRequest::new(ReadKind::Narrow, |_| {});
        service.service_one(request, &mut NullPins, &TestClock::default(), &mut sink);

        assert_eq!(sink.events.len(), 2);
        assert_eq!(sink.events[0], AppEvent::ReadingStarted(ReadKind::Narrow));
        assert!(matches!(
            sink.events[1],
            AppEvent::ReadingCompleted {
                kind: ReadKind::Narrow,
                ..
            }
        ));
    }

    #[test]
    fn run_drains_queued_requests_in_fifo_order_then_stops() {
        let (mut service, handle, _cell) = service();
        let order = Arc::new(Mutex::new(Vec::new()));
        for kind in [ReadKind::Wide, ReadKind::Narrow, ReadKind::Wide] {
            let order = Arc::clone(&order);
            assert!(handle.request_reading(kind, move |_| {
                order.lock().unwrap().push(kind);
            }));
        }
        // Dropping the last handle disconnects the channel, so `run`
        // returns after draining the queue.
        drop(handle);

        let shutdown = AtomicBool::new(false);
        let mut sink = CaptureSink::default();
        service.run(
            &mut NullPins,
            &TestClock::default(),
            &mut sink,
            &shutdown,
        );

        assert_eq!(
            order.lock().unwrap().clone(),
            vec![ReadKind::Wide, ReadKind::Narrow, ReadKind::Wide]
        );
        assert_eq!(sink.events[0], AppEvent::Started);
    }

    #[test]
    fn shutdown_flag_stops_an_idle_service() {
        let (mut service, _handle, _cell) = service();
        let shutdown = AtomicBool::new(true);
        let mut sink = CaptureSink::default();
        // Pre-set shutdown: run must initialise, then return without
        // waiting on the queue.
        service.run(
            &mut NullPins,
            &TestClock::default(),
            &mut sink,
            &shutdown,
        );
        assert_eq!(sink.events, vec![AppEvent::Started]);
    }
}
