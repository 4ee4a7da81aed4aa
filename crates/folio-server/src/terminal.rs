//! Terminal driver over an SSH session channel.
//!
//! Implements the [`Driver`] trait for a remote visitor: ratatui renders
//! through a [`ChannelBackend`] into a [`ChannelWriter`], whose flushed bytes
//! are forwarded to the SSH channel by a background task. Input comes from the
//! connection's [`ConnectionEvent`] stream and is decoded into keys.
//!
//! The visitor's terminal is only known through what the client reported, so
//! nothing here may ask the local process's terminal for its size or cursor.

use std::{
    collections::VecDeque,
    io::{self, Write},
    mem,
    sync::Arc,
};

use crossterm::{
    ExecutableCommand, cursor,
    terminal::{Clear, EnterAlternateScreen, LeaveAlternateScreen},
};
use folio_app::{App, AppEvent, Driver};
use folio_tui::{Theme, input::KeyDecoder, ui};
use ratatui::{
    Terminal, TerminalOptions, Viewport,
    backend::{Backend, ClearType, CrosstermBackend, WindowSize},
    buffer::Cell,
    layout::{Position, Size},
};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    ConnectionEvent, SessionChannel, SessionError,
    session::{LoopOptions, PtySize},
};

/// `io::Write` sink that hands each flushed batch of bytes to a queue.
///
/// Writes are buffered until `flush`, so one ratatui frame becomes one SSH
/// data message.
pub struct ChannelWriter {
    buffer: Vec<u8>,
    sender: UnboundedSender<Vec<u8>>,
}

impl ChannelWriter {
    /// Create a writer feeding `sender`.
    pub fn new(sender: UnboundedSender<Vec<u8>>) -> Self {
        Self { buffer: Vec::new(), sender }
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.sender
            .send(mem::take(&mut self.buffer))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "session output closed"))
    }
}

/// Crossterm backend for a remote terminal.
///
/// Drawing goes through [`CrosstermBackend`]. Size and cursor position are
/// answered from the pty size and the last cursor move instead of being
/// queried, since crossterm would query the server's own tty.
pub struct ChannelBackend {
    inner: CrosstermBackend<ChannelWriter>,
    size: Size,
    cursor: Position,
}

impl ChannelBackend {
    /// Backend for a terminal of `size`.
    pub fn new(writer: ChannelWriter, size: PtySize) -> Self {
        Self {
            inner: CrosstermBackend::new(writer),
            size: Size::new(size.cols, size.rows),
            cursor: Position::ORIGIN,
        }
    }

    /// Record a new window size reported by the client.
    pub fn set_size(&mut self, size: PtySize) {
        self.size = Size::new(size.cols, size.rows);
    }
}

impl Write for ChannelBackend {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.inner)
    }
}

impl Backend for ChannelBackend {
    type Error = io::Error;

    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        let mut last = None;
        self.inner.draw(content.inspect(|&(x, y, _)| last = Some(Position::new(x, y))))?;
        if let Some(position) = last {
            self.cursor = Position::new(position.x.saturating_add(1), position.y);
        }
        Ok(())
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        Ok(self.cursor)
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        let position = position.into();
        self.inner.set_cursor_position(position)?;
        self.cursor = position;
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.inner.clear()
    }

    fn clear_region(&mut self, clear_type: ClearType) -> io::Result<()> {
        self.inner.clear_region(clear_type)
    }

    fn size(&self) -> io::Result<Size> {
        Ok(self.size)
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        Ok(WindowSize { columns_rows: self.size, pixels: Size::default() })
    }

    fn flush(&mut self) -> io::Result<()> {
        Backend::flush(&mut self.inner)
    }
}

type ChannelTerminal = Terminal<ChannelBackend>;

/// Terminal driver implementing the [`Driver`] trait over an SSH channel.
pub struct SshTerminal<C: SessionChannel> {
    /// `None` once stopped.
    terminal: Option<ChannelTerminal>,
    channel: C,
    events: UnboundedReceiver<ConnectionEvent<C>>,
    keys: KeyDecoder,
    /// Keys decoded from an input chunk but not yet handed out.
    pending: VecDeque<AppEvent>,
    output: Option<JoinHandle<()>>,
    shutdown: CancellationToken,
    theme: Arc<Theme>,
    options: LoopOptions,
}

impl<C: SessionChannel> SshTerminal<C> {
    /// Take over the visitor's terminal.
    ///
    /// Spawns the output task, then switches to the alternate screen (if
    /// requested), hides the cursor and clears.
    pub fn start(
        channel: C,
        events: UnboundedReceiver<ConnectionEvent<C>>,
        size: PtySize,
        options: LoopOptions,
        theme: Arc<Theme>,
        shutdown: CancellationToken,
    ) -> Result<Self, SessionError> {
        let size = size.clamped();
        let (sender, queue) = mpsc::unbounded_channel();
        let output = tokio::spawn(forward_output(channel.clone(), queue));

        let backend = ChannelBackend::new(ChannelWriter::new(sender), size);
        let viewport = Viewport::Fixed(size.area());
        let mut terminal = Terminal::with_options(backend, TerminalOptions { viewport })?;

        if options.alt_screen {
            terminal.backend_mut().execute(EnterAlternateScreen)?;
        }
        terminal.backend_mut().execute(cursor::Hide)?;
        terminal.backend_mut().execute(Clear(crossterm::terminal::ClearType::All))?;

        Ok(Self {
            terminal: Some(terminal),
            channel,
            events,
            keys: KeyDecoder::new(),
            pending: VecDeque::new(),
            output: Some(output),
            shutdown,
            theme,
            options,
        })
    }

    fn resize(&mut self, size: PtySize) -> Result<(), SessionError> {
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.backend_mut().set_size(size);
            terminal.resize(size.area())?;
        }
        Ok(())
    }

    /// Give the visitor's terminal back in the state it was found.
    fn restore(&mut self) -> Result<(), SessionError> {
        let Some(mut terminal) = self.terminal.take() else {
            return Ok(());
        };

        terminal.show_cursor()?;
        if self.options.alt_screen {
            terminal.backend_mut().execute(LeaveAlternateScreen)?;
        }
        Backend::flush(terminal.backend_mut())?;
        Ok(())
    }
}

/// Copy queued output to the channel until the queue closes or the channel
/// fails.
async fn forward_output<C: SessionChannel>(channel: C, mut queue: UnboundedReceiver<Vec<u8>>) {
    while let Some(bytes) = queue.recv().await {
        if let Err(e) = channel.send(bytes).await {
            tracing::debug!("dropping session output: {}", e);
            break;
        }
    }
}

impl<C: SessionChannel> Driver for SshTerminal<C> {
    type Error = SessionError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            let event = tokio::select! {
                biased;

                () = self.shutdown.cancelled() => return Ok(Some(AppEvent::Shutdown)),
                event = self.events.recv() => event,
            };

            match event {
                Some(ConnectionEvent::Input(bytes)) => {
                    self.pending.extend(self.keys.feed(&bytes).into_iter().map(AppEvent::Key));
                },
                Some(ConnectionEvent::WindowChanged(size)) => {
                    let size = size.clamped();
                    self.resize(size)?;
                    self.pending.push_back(AppEvent::Resize(size.cols, size.rows));
                },
                Some(ConnectionEvent::Closed) | None => return Ok(None),
                Some(
                    ConnectionEvent::Authenticated { .. }
                    | ConnectionEvent::SessionOpened(_)
                    | ConnectionEvent::PtyRequested { .. }
                    | ConnectionEvent::ShellRequested,
                ) => {},
            }
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let theme = &self.theme;
        if let Some(terminal) = self.terminal.as_mut() {
            terminal.draw(|frame| ui::render(frame, app, theme))?;
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), Self::Error> {
        let restored = self.restore();

        // Terminal and its writer are gone, so the output task drains and ends.
        if let Some(output) = self.output.take() {
            if let Err(e) = output.await {
                tracing::warn!("session output task failed: {}", e);
            }
        }

        restored?;
        self.channel.exit(0).await?;
        self.channel.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(size: PtySize) -> (ChannelBackend, UnboundedReceiver<Vec<u8>>) {
        let (sender, queue) = mpsc::unbounded_channel();
        (ChannelBackend::new(ChannelWriter::new(sender), size), queue)
    }

    fn drain(queue: &mut UnboundedReceiver<Vec<u8>>) -> Vec<u8> {
        let mut bytes = Vec::new();
        while let Ok(chunk) = queue.try_recv() {
            bytes.extend(chunk);
        }
        bytes
    }

    #[test]
    fn backend_reports_client_window() {
        let (mut backend, _queue) = backend(PtySize::new(120, 40));
        assert_eq!(backend.size().unwrap(), Size::new(120, 40));

        backend.set_size(PtySize::new(80, 24));
        assert_eq!(backend.window_size().unwrap().columns_rows, Size::new(80, 24));
    }

    #[test]
    fn cursor_moves_are_tracked_and_sent() {
        let (mut backend, mut queue) = backend(PtySize::new(80, 24));
        assert_eq!(backend.get_cursor_position().unwrap(), Position::ORIGIN);

        backend.set_cursor_position(Position::new(3, 7)).unwrap();
        assert_eq!(backend.get_cursor_position().unwrap(), Position::new(3, 7));
        assert_eq!(drain(&mut queue), b"\x1b[8;4H");

        let cell = Cell::default();
        backend.draw([(5, 2, &cell)].into_iter()).unwrap();
        assert_eq!(backend.get_cursor_position().unwrap(), Position::new(6, 2));
    }

    #[test]
    fn clear_and_resize_write_only_to_the_channel() {
        let size = PtySize::new(40, 10);
        let (backend, mut queue) = backend(size);
        let viewport = Viewport::Fixed(size.area());
        let mut terminal = Terminal::with_options(backend, TerminalOptions { viewport }).unwrap();

        terminal.clear().unwrap();
        let smaller = PtySize::new(20, 5);
        terminal.backend_mut().set_size(smaller);
        terminal.resize(smaller.area()).unwrap();
        Backend::flush(terminal.backend_mut()).unwrap();

        let output = String::from_utf8(drain(&mut queue)).unwrap();
        // Shrinking clears the whole screen before the viewport.
        assert!(output.contains("\x1b[2J"), "{output:?}");
        assert_eq!(terminal.size().unwrap(), Size::new(20, 5));
    }

    #[test]
    fn huge_window_is_clamped() {
        let (backend, _queue) = backend(PtySize::MAX);
        let viewport = Viewport::Fixed(PtySize::new(u16::MAX, u16::MAX).clamped().area());
        let mut terminal = Terminal::with_options(backend, TerminalOptions { viewport }).unwrap();

        assert_eq!(terminal.get_frame().area(), PtySize::MAX.area());
    }
}
