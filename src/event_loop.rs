use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    /// Continue, but wait no longer than this for input before the next
    /// idle call. Only meaningful from the idle call.
    Sleep(Duration),
    Quit,
}

/// Single-threaded pump that feeds terminal input and idle ticks to the page.
///
/// The handler is called with `None` once per iteration before polling, which
/// is where deferred page work (focus moves, scroll animation) runs and the
/// frame is drawn. Pending input is drained in one go so bursts of key
/// repeats do not queue up behind redraws.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            let timeout = match handler(&mut self.driver, None)? {
                ControlFlow::Quit => return Ok(()),
                ControlFlow::Sleep(wait) => wait.min(self.poll_interval),
                ControlFlow::Continue => self.poll_interval,
            };
            if !self.driver.poll(timeout)? {
                continue;
            }
            loop {
                let event = self.driver.read()?;
                if handler(&mut self.driver, Some(event))? == ControlFlow::Quit {
                    return Ok(());
                }
                if !self.driver.poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}

/// Input driver that replays a fixed list of events, then reports idle.
#[derive(Debug, Default)]
pub struct ScriptedDriver {
    events: VecDeque<Event>,
}

impl ScriptedDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputDriver for ScriptedDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> io::Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}
