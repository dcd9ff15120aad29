//! Raspberry Pi GPIO adapter (rppal).
//!
//! Wires the port traits to real pins:
//!
//! * Output lines (scale, select, /OE, chime) are rppal `OutputPin`s.
//! * The sensor's OUT line is a rising-edge interrupt that stamps a
//!   microsecond tick and feeds the frequency counter.
//! * Select-line transitions are fed to the counter synchronously from
//!   `set_line` — the daemon drives those lines itself, so it is its own
//!   edge feed for them.  Re-asserting an unchanged level is filtered out
//!   here, matching the electrical reality that only a level change is an
//!   edge.
//!
//! The counter is shared between the interrupt thread and the sequencing
//! thread behind a mutex held only for the few integer operations of one
//! edge.  rppal restores every pin's previous state on drop, which covers
//! teardown on all exit paths.

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use log::warn;
use rppal::gpio::{Gpio, InputPin, OutputPin, Trigger};

use crate::adapters::clock::SystemClock;
use crate::app::ports::PinPort;
use crate::events::{ReadKind, RequestLatch};
use crate::pins::{self, Level, Line};
use crate::sensor::{EdgeCounter, EdgeLine, Filter, SelectLine};

fn to_rppal(level: Level) -> rppal::gpio::Level {
    match level {
        Level::Low => rppal::gpio::Level::Low,
        Level::High => rppal::gpio::Level::High,
    }
}

// ---------------------------------------------------------------------------
// Sensor head
// ---------------------------------------------------------------------------

/// GPIO adapter for the TCS3200 head: all its output lines plus the OUT
/// interrupt.
pub struct SensorPins {
    scale0: OutputPin,
    scale1: OutputPin,
    select_a: OutputPin,
    select_b: OutputPin,
    output_enable: OutputPin,
    /// Last driven (A, B) levels, for edge deduplication.
    select_levels: (Level, Level),
    counter: Arc<Mutex<EdgeCounter>>,
    clock: Arc<SystemClock>,
    /// Held so the OUT interrupt stays registered.
    _frequency: InputPin,
}

impl SensorPins {
    /// Claim the sensor pins and register the OUT interrupt.
    ///
    /// The select lines are parked on Clear, matching the counter's
    /// initial window.
    pub fn new(
        gpio: &Gpio,
        counter: Arc<Mutex<EdgeCounter>>,
        clock: Arc<SystemClock>,
    ) -> Result<Self> {
        let scale0 = gpio.get(Line::Scale0.bcm())?.into_output();
        let scale1 = gpio.get(Line::Scale1.bcm())?.into_output();
        let mut select_a = gpio.get(Line::SelectA.bcm())?.into_output();
        let mut select_b = gpio.get(Line::SelectB.bcm())?.into_output();
        let mut output_enable = gpio.get(Line::OutputEnable.bcm())?.into_output();

        let clear = Filter::Clear.select_levels();
        select_a.write(to_rppal(clear.0));
        select_b.write(to_rppal(clear.1));
        output_enable.write(to_rppal(pins::OUTPUT_ENABLE_INACTIVE));

        let mut frequency = gpio
            .get(pins::FREQUENCY_GPIO)
            .context("claiming sensor OUT line")?
            .into_input();
        let isr_counter = Arc::clone(&counter);
        let isr_clock = Arc::clone(&clock);
        frequency
            .set_async_interrupt(Trigger::RisingEdge, move |_| {
                let tick = isr_clock.tick_us();
                if let Ok(mut c) = isr_counter.lock() {
                    c.on_edge(EdgeLine::Frequency, Level::High, tick);
                }
            })
            .context("registering sensor OUT interrupt")?;

        Ok(Self {
            scale0,
            scale1,
            select_a,
            select_b,
            output_enable,
            select_levels: clear,
            counter,
            clock,
            _frequency: frequency,
        })
    }

    fn write_select(&mut self, which: SelectLine, level: Level) {
        let slot = match which {
            SelectLine::A => &mut self.select_levels.0,
            SelectLine::B => &mut self.select_levels.1,
        };
        if *slot == level {
            return;
        }
        *slot = level;

        match which {
            SelectLine::A => self.select_a.write(to_rppal(level)),
            SelectLine::B => self.select_b.write(to_rppal(level)),
        }
        let tick = self.clock.tick_us();
        if let Ok(mut counter) = self.counter.lock() {
            counter.on_edge(EdgeLine::Select(which), level, tick);
        }
    }
}

impl PinPort for SensorPins {
    fn set_line(&mut self, line: Line, level: Level) {
        match line {
            Line::Scale0 => self.scale0.write(to_rppal(level)),
            Line::Scale1 => self.scale1.write(to_rppal(level)),
            Line::SelectA => self.write_select(SelectLine::A, level),
            Line::SelectB => self.write_select(SelectLine::B, level),
            Line::OutputEnable => self.output_enable.write(to_rppal(level)),
            Line::Chime => warn!("chime line is not part of the sensor head"),
        }
    }
}

// ---------------------------------------------------------------------------
// Chime
// ---------------------------------------------------------------------------

/// GPIO adapter for the chime line, owned by the feedback thread.
pub struct ChimePin {
    pin: OutputPin,
}

impl ChimePin {
    pub fn new(gpio: &Gpio) -> Result<Self> {
        let mut pin = gpio.get(Line::Chime.bcm())?.into_output();
        pin.set_low();
        Ok(Self { pin })
    }
}

impl PinPort for ChimePin {
    fn set_line(&mut self, line: Line, level: Level) {
        if line == Line::Chime {
            self.pin.write(to_rppal(level));
        } else {
            warn!("{line:?} is not the chime line");
        }
    }
}

// ---------------------------------------------------------------------------
// Buttons
// ---------------------------------------------------------------------------

/// Keeps the button interrupts registered for the life of the daemon.
pub struct ButtonPins {
    _narrow: InputPin,
    _wide: InputPin,
}

/// Claim both request buttons and latch presses from their rising edges.
pub fn register_buttons(gpio: &Gpio, latch: Arc<RequestLatch>) -> Result<ButtonPins> {
    let mut narrow = gpio.get(pins::BUTTON_NARROW_GPIO)?.into_input_pullup();
    let narrow_latch = Arc::clone(&latch);
    narrow
        .set_async_interrupt(Trigger::RisingEdge, move |_| {
            narrow_latch.signal(ReadKind::Narrow);
        })
        .context("registering narrow button interrupt")?;

    let mut wide = gpio.get(pins::BUTTON_WIDE_GPIO)?.into_input_pullup();
    let wide_latch = latch;
    wide.set_async_interrupt(Trigger::RisingEdge, move |_| {
        wide_latch.signal(ReadKind::Wide);
    })
    .context("registering wide button interrupt")?;

    Ok(ButtonPins {
        _narrow: narrow,
        _wide: wide,
    })
}
