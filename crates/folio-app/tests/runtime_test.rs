//! Runtime loop tests with a scripted driver.
//!
//! The driver replays a fixed list of events and records every render, so
//! the loop's ordering guarantees can be checked without a terminal.

use std::{collections::VecDeque, convert::Infallible};

use folio_app::{App, AppEvent, Driver, KeyInput, Runtime, SessionEnd};

/// Driver that replays events and records the active tab at each render.
#[derive(Default)]
struct ScriptedDriver {
    events: VecDeque<AppEvent>,
    renders: Vec<usize>,
    stopped: bool,
}

impl ScriptedDriver {
    fn new(events: impl IntoIterator<Item = AppEvent>) -> Self {
        Self { events: events.into_iter().collect(), ..Self::default() }
    }
}

impl Driver for &mut ScriptedDriver {
    type Error = Infallible;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(self.events.pop_front())
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.renders.push(app.active_tab());
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        self.stopped = true;
        Ok(())
    }
}

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyInput::Char(c))
}

#[tokio::test]
async fn renders_once_per_event_until_quit() {
    let mut driver = ScriptedDriver::new([key('c'), key('x'), key('q'), key('a')]);

    let end = Runtime::new(&mut driver, App::new(100, 30)).run().await;

    assert_eq!(end, Ok(SessionEnd::Quit));
    // Initial render, then one per event before the quit.
    assert_eq!(driver.renders, vec![0, 1, 1]);
    assert!(driver.stopped);
    // The key after the quit is never read.
    assert_eq!(driver.events.len(), 1);
}

#[tokio::test]
async fn interrupt_quits_from_any_tab() {
    let mut driver = ScriptedDriver::new([key('c'), AppEvent::Key(KeyInput::INTERRUPT)]);

    let end = Runtime::new(&mut driver, App::new(100, 30)).run().await;

    assert_eq!(end, Ok(SessionEnd::Quit));
    assert_eq!(driver.renders, vec![0, 1]);
}

#[tokio::test]
async fn input_end_is_a_disconnect() {
    let mut driver = ScriptedDriver::new([key('c')]);

    let end = Runtime::new(&mut driver, App::new(100, 30)).run().await;

    assert_eq!(end, Ok(SessionEnd::Disconnected));
    assert!(driver.stopped);
}

#[tokio::test]
async fn shutdown_event_ends_session() {
    let mut driver = ScriptedDriver::new([key('c'), AppEvent::Shutdown, key('a')]);

    let end = Runtime::new(&mut driver, App::new(100, 30)).run().await;

    assert_eq!(end, Ok(SessionEnd::Shutdown));
    assert_eq!(driver.renders, vec![0, 1]);
    assert!(driver.stopped);
}
