//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O): the output depends only
//! on the active tab, the terminal width recorded at session start, and the
//! theme.
//!
//! The page is laid out top to bottom: banner, tab row, the active tab's
//! blocks in order, footer. Sections are placed at fixed offsets rather than
//! through a constraint layout, so content taller than the terminal is
//! clipped instead of squeezed.

mod banner;
mod blocks;
mod footer;
mod tabs;

use folio_app::App;
use ratatui::{
    Frame,
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::Widget,
};

use crate::Theme;

const PAGE_PADDING_X: u16 = 2;
const PAGE_PADDING_Y: u16 = 1;
const BANNER_GAP: u16 = 1;

/// Render the session view into a terminal frame, clipped to its area.
pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    frame.render_widget(PortfolioView::new(app, theme), frame.area());
}

/// Render the full page, however tall, into a fresh buffer.
///
/// The buffer is as wide as the terminal recorded in `app` and as tall as
/// [`page_height`].
pub fn render_to_buffer(app: &App, theme: &Theme) -> Buffer {
    let (cols, _) = app.terminal_size();
    let area = Rect::new(0, 0, cols, page_height(app));
    let mut buffer = Buffer::empty(area);
    PortfolioView::new(app, theme).render(area, &mut buffer);
    buffer
}

/// Rows needed to show the whole page for the active tab.
pub fn page_height(app: &App) -> u16 {
    let blocks: u16 = app.active_blocks().iter().map(blocks::height).sum();
    PAGE_PADDING_Y
        + banner::height(app.content())
        + BANNER_GAP
        + tabs::HEIGHT
        + blocks
        + footer::HEIGHT
        + PAGE_PADDING_Y
}

/// Plain text of each buffer row, trailing spaces removed.
///
/// Cells hidden behind a wide character are skipped.
pub fn buffer_lines(buffer: &Buffer) -> Vec<String> {
    let area = *buffer.area();
    (area.top()..area.bottom())
        .map(|y| {
            let mut line = String::new();
            let mut hidden = 0;
            for x in area.left()..area.right() {
                if hidden > 0 {
                    hidden -= 1;
                    continue;
                }
                let symbol = buffer[(x, y)].symbol();
                hidden = Span::raw(symbol).width().saturating_sub(1);
                line.push_str(symbol);
            }
            line.trim_end().to_string()
        })
        .collect()
}

/// Display width of the widest line.
fn text_width<'a>(lines: impl IntoIterator<Item = &'a str>) -> u16 {
    let widest = lines.into_iter().map(|line| Span::raw(line).width()).max().unwrap_or(0);
    u16::try_from(widest).unwrap_or(u16::MAX)
}

/// Number of rows a piece of text occupies.
fn text_height(text: &str) -> u16 {
    u16::try_from(text.lines().count()).unwrap_or(u16::MAX)
}

/// Width of the page column: the padded banner, or less on narrow terminals.
fn page_width(app: &App) -> u16 {
    let (cols, _) = app.terminal_size();
    cols.saturating_sub(2 * PAGE_PADDING_X).min(banner::width(app.content()))
}

/// Hands out consecutive rows of the page column, clipped to the render area.
struct Column {
    x: u16,
    y: u16,
    width: u16,
    bounds: Rect,
}

impl Column {
    fn new(bounds: Rect, width: u16) -> Self {
        Self {
            x: bounds.x.saturating_add(PAGE_PADDING_X),
            y: bounds.y.saturating_add(PAGE_PADDING_Y),
            width,
            bounds,
        }
    }

    /// Next `height` rows. `None` once they fall outside the render area.
    fn take(&mut self, height: u16) -> Option<Rect> {
        let rect = Rect::new(self.x, self.y, self.width, height).intersection(self.bounds);
        self.skip(height);
        (!rect.is_empty()).then_some(rect)
    }

    fn skip(&mut self, height: u16) {
        self.y = self.y.saturating_add(height);
    }
}

/// Whole-page widget for one session.
pub struct PortfolioView<'a> {
    app: &'a App,
    theme: &'a Theme,
}

impl<'a> PortfolioView<'a> {
    /// Create the view for a session.
    pub fn new(app: &'a App, theme: &'a Theme) -> Self {
        Self { app, theme }
    }
}

impl Widget for PortfolioView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let content = self.app.content();
        let mut column = Column::new(area, page_width(self.app));

        if let Some(rect) = column.take(banner::height(content)) {
            banner::render(content, rect, buf);
        }
        column.skip(BANNER_GAP);

        if let Some(rect) = column.take(tabs::HEIGHT) {
            tabs::render(self.app, self.theme, rect, buf);
        }

        for block in self.app.active_blocks() {
            if let Some(rect) = column.take(blocks::height(block)) {
                blocks::render(block, self.theme, rect, buf);
            }
        }

        if let Some(rect) = column.take(footer::HEIGHT) {
            footer::render(content, rect, buf);
        }
    }
}
