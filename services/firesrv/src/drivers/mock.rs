//! Recording driver doubles for tests
//!
//! Every display and buzzer call is captured in order in a [`CallLog`]
//! shared with the test. [`FakeSensor`] replays readings pushed through a
//! [`SensorFeed`] and holds the last level once the queue is drained.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Buzzer, Display, DriverError, DriverResult, Panel, Rgb, SharedPanel, TemperatureSensor};

/// One recorded driver call
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCall {
    Color(Rgb),
    Write(u8, String),
    Volume(f32),
    Play(u32),
    Stop,
}

#[derive(Debug, Default)]
struct LogState {
    calls: Vec<PanelCall>,
    fail_display: bool,
    fail_buzzer: bool,
    sounding: bool,
    color: Option<Rgb>,
    lines: [String; 2],
}

/// Shared view of the calls made on a recording panel
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    state: Arc<Mutex<LogState>>,
}

impl CallLog {
    /// Drain the recorded calls
    pub fn take(&self) -> Vec<PanelCall> {
        std::mem::take(&mut self.state.lock().calls)
    }

    /// Copy of the recorded calls
    pub fn calls(&self) -> Vec<PanelCall> {
        self.state.lock().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&PanelCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    pub fn is_sounding(&self) -> bool {
        self.state.lock().sounding
    }

    /// Last backlight color set, if any
    pub fn color(&self) -> Option<Rgb> {
        self.state.lock().color
    }

    /// Current text of a display line
    pub fn line(&self, line: u8) -> String {
        self.state
            .lock()
            .lines
            .get(usize::from(line))
            .cloned()
            .unwrap_or_default()
    }

    /// Make every display call fail from now on
    pub fn fail_display(&self, fail: bool) {
        self.state.lock().fail_display = fail;
    }

    /// Make every buzzer call fail from now on
    pub fn fail_buzzer(&self, fail: bool) {
        self.state.lock().fail_buzzer = fail;
    }
}

pub struct RecordingDisplay {
    log: CallLog,
}

impl Display for RecordingDisplay {
    fn set_color(&mut self, color: Rgb) -> DriverResult<()> {
        let mut state = self.log.state.lock();
        if state.fail_display {
            return Err(DriverError::Bus("display offline".to_string()));
        }
        state.color = Some(color);
        state.calls.push(PanelCall::Color(color));
        Ok(())
    }

    fn write_line(&mut self, line: u8, text: &str) -> DriverResult<()> {
        let mut state = self.log.state.lock();
        if state.fail_display {
            return Err(DriverError::Bus("display offline".to_string()));
        }
        let slot = state
            .lines
            .get_mut(usize::from(line))
            .ok_or_else(|| DriverError::Bus(format!("no display line {}", line)))?;
        *slot = text.to_string();
        state.calls.push(PanelCall::Write(line, text.to_string()));
        Ok(())
    }
}

pub struct RecordingBuzzer {
    log: CallLog,
}

impl RecordingBuzzer {
    fn record(&self, call: PanelCall) -> DriverResult<()> {
        let mut state = self.log.state.lock();
        if state.fail_buzzer {
            return Err(DriverError::Unavailable("buzzer offline".to_string()));
        }
        match call {
            PanelCall::Play(_) => state.sounding = true,
            PanelCall::Stop => state.sounding = false,
            _ => {},
        }
        state.calls.push(call);
        Ok(())
    }
}

impl Buzzer for RecordingBuzzer {
    fn set_volume(&mut self, level: f32) -> DriverResult<()> {
        self.record(PanelCall::Volume(level))
    }

    fn play(&mut self, frequency_hz: u32) -> DriverResult<()> {
        self.record(PanelCall::Play(frequency_hz))
    }

    fn stop(&mut self) -> DriverResult<()> {
        self.record(PanelCall::Stop)
    }
}

/// Panel wired to recording display and buzzer, plus the log they share
pub fn recording_panel() -> (SharedPanel, CallLog) {
    let log = CallLog::default();
    let panel = Panel::new(
        Box::new(RecordingDisplay { log: log.clone() }),
        Box::new(RecordingBuzzer { log: log.clone() }),
    );
    (panel.shared(), log)
}

#[derive(Debug, Default)]
struct FeedState {
    queue: VecDeque<DriverResult<f64>>,
    last: f64,
    reads: usize,
}

/// Handle for pushing readings into a [`FakeSensor`]
#[derive(Debug, Clone, Default)]
pub struct SensorFeed {
    state: Arc<Mutex<FeedState>>,
}

impl SensorFeed {
    pub fn push(&self, value: f64) {
        self.state.lock().queue.push_back(Ok(value));
    }

    pub fn push_all(&self, values: impl IntoIterator<Item = f64>) {
        let mut state = self.state.lock();
        state.queue.extend(values.into_iter().map(Ok));
    }

    /// Queue one failed read
    pub fn push_failure(&self) {
        self.state
            .lock()
            .queue
            .push_back(Err(DriverError::InvalidReading("sensor fault".to_string())));
    }

    /// Number of reads performed so far
    pub fn reads(&self) -> usize {
        self.state.lock().reads
    }
}

pub struct FakeSensor {
    feed: SensorFeed,
}

impl FakeSensor {
    /// Sensor reading `initial` until something is pushed
    pub fn new(initial: f64) -> (Self, SensorFeed) {
        let feed = SensorFeed::default();
        feed.state.lock().last = initial;
        (Self { feed: feed.clone() }, feed)
    }
}

impl TemperatureSensor for FakeSensor {
    fn read(&mut self) -> DriverResult<f64> {
        let mut state = self.feed.state.lock();
        state.reads += 1;
        match state.queue.pop_front() {
            Some(Ok(value)) => {
                state.last = value;
                Ok(value)
            },
            Some(Err(e)) => Err(e),
            None => Ok(state.last),
        }
    }
}
