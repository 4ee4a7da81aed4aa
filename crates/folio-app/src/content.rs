//! Static portfolio content.
//!
//! Everything a visitor can read lives here as `'static` data: the banner,
//! the ordered tabs with their blocks of text, and the footer hint. Blocks are
//! kept in slices so the rendering order is the declaration order.

/// Foreground tone of a content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    /// Terminal default foreground.
    #[default]
    Default,
    /// Theme accent colour.
    Accent,
}

/// Terminal-agnostic rendering attributes of a content block.
///
/// Frontends map these onto their own style types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStyle {
    /// Render the text in bold.
    pub bold: bool,
    /// Foreground tone.
    pub tone: Tone,
    /// Draw a horizontal rule below the block.
    pub border_bottom: bool,
    /// Blank rows above and below the text.
    pub padding_y: u16,
    /// Blank columns left and right of the text.
    pub padding_x: u16,
}

impl BlockStyle {
    /// Plain text with the default block padding.
    pub const PLAIN: Self =
        Self { bold: false, tone: Tone::Default, border_bottom: false, padding_y: 1, padding_x: 2 };

    /// Bold, accented heading.
    pub const HEADING: Self = Self::PLAIN.bold().tone(Tone::Accent);

    /// Same style, bold.
    pub const fn bold(self) -> Self {
        Self { bold: true, ..self }
    }

    /// Same style, with the given tone.
    pub const fn tone(self, tone: Tone) -> Self {
        Self { tone, ..self }
    }

    /// Same style, with a rule below it.
    pub const fn border_bottom(self) -> Self {
        Self { border_bottom: true, ..self }
    }
}

impl Default for BlockStyle {
    fn default() -> Self {
        Self::PLAIN
    }
}

/// One styled unit of text within a tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentBlock {
    /// Rendering attributes.
    pub style: BlockStyle,
    /// Literal text. May span several lines.
    pub text: &'static str,
}

impl ContentBlock {
    const fn new(style: BlockStyle, text: &'static str) -> Self {
        Self { style, text }
    }
}

/// A named, selectable view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    /// Display name.
    pub title: &'static str,
    /// Key that selects this tab.
    pub shortcut: char,
    /// Blocks in vertical rendering order.
    pub blocks: &'static [ContentBlock],
}

impl Tab {
    /// Label shown in the tab row, e.g. `About (a)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.title, self.shortcut)
    }
}

/// The full set of content served to every session.
#[derive(Debug, PartialEq, Eq)]
pub struct Content {
    banner: &'static [&'static str],
    tabs: &'static [Tab],
    footer: &'static str,
}

impl Content {
    /// Built-in portfolio content.
    pub fn portfolio() -> &'static Self {
        &PORTFOLIO
    }

    /// Tabs in display order. A tab's identity is its index.
    pub fn tabs(&self) -> &'static [Tab] {
        self.tabs
    }

    /// Tab names in display order.
    pub fn tab_titles(&self) -> impl Iterator<Item = &'static str> {
        self.tabs.iter().map(|tab| tab.title)
    }

    /// Number of tabs.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Blocks of the tab at `index`, in order. Empty for an unknown index.
    pub fn content_for(&self, index: usize) -> &'static [ContentBlock] {
        self.tabs.get(index).map_or(&[], |tab| tab.blocks)
    }

    /// Index of the tab selected by `shortcut`, if any.
    pub fn tab_for_shortcut(&self, shortcut: char) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.shortcut == shortcut)
    }

    /// Banner lines shown above the tab row.
    pub fn banner(&self) -> &'static [&'static str] {
        self.banner
    }

    /// Hint line shown below the content.
    pub fn footer(&self) -> &'static str {
        self.footer
    }
}

const BANNER: &[&str] = &[
    r" ______  ________  ___   __   ___   __   __  __     ________  ______  ________  ________  ______",
    r"/_____/\/_______/\/__/\ /__/\/__/\ /__/\/_/\/_/\   /_______/\/_____/\/_______/\/_______/\/_____/\",
    r"\:::_ \ \::: _  \ \::\_\\  \ \::\_\\  \ \ \ \ \ \  \__.::._\/\::::_\/\::: _  \ \::: _  \ \:::__\/",
    r" \:\ \ \ \::(_)  \ \:. '-\  \ \:. '-\  \ \:\_\ \ \    \::\ \  \:\/___/\::(_)  \ \::(_)  \ \:\ \  __",
    r"  \:\ \ \ \:: __  \ \:. _    \ \:. _    \ \::::_\/    _\::\ \__\_::._\:\:: __  \ \:: __  \ \:\ \/_/\",
    r"   \:\/.:| \:.\ \  \ \. \'-\  \ \. \'-\  \ \\::\ \   /__\::\__/\ /____\:\:.\ \  \ \:.\ \  \ \:\_\ \ \",
    r"    \____/_/\__\/\__\/\__\/ \__\/\__\/ \__\/ \__\/   \________\/ \_____\/\__\/\__\/\__\/\__\/\_____\/",
];

const HEART: &str = "   &&&&&&&   &&&&&&&
  &&&&&&&&&&&&&&&&&&&&
 &&&&&&&&&&&&&&&&&&&&&
 &&&&&&&&&&&&&&&&&&&&&
 &&&&&&&&&&&&&&&&&&&&&
  &&&&&&&&&&&&&&&&&&&
    &&&&&&&&&&&&&&&
      &&&&&&&&&&&
        &&&&&&&
          &&&";

const ABOUT: &[ContentBlock] = &[
    ContentBlock::new(BlockStyle::HEADING, "# Hey there! So cool that you're SSH'd in! 🚀"),
    ContentBlock::new(
        BlockStyle::PLAIN,
        "My name's Danny and this is a fun little project to play around with the Go programming language\n\
         and make my little portfolio site (https://dannyisaac.com) a bit more interesting.",
    ),
    ContentBlock::new(
        BlockStyle::PLAIN,
        "I'm a fullstack software engineer currently working at a company called Klarna, where I'm\n\
         part of a team that's working on making https://www.klarna.com a smoother and more enjoyable experience\n\
         for our +150M global users.",
    ),
    ContentBlock::new(
        BlockStyle::PLAIN,
        "I really love what I do and I'm always looking for new challenges and ways to grow as an engineer.\n\
         I'm also a musician and have been playing the piano professionally for over 15 years now.",
    ),
    ContentBlock::new(
        BlockStyle::PLAIN,
        "With that said, thank you again for SSHing in and please feel free to reach out\n\
         to me on LinkedIn or via email (press c) if you have any questions or just want to chat.\n\
         I'm always up for a good conversation!",
    ),
    ContentBlock::new(
        BlockStyle::PLAIN.border_bottom(),
        "I hope you have a great day and that you enjoy the rest of your time on my site. Take care!",
    ),
    ContentBlock::new(BlockStyle::PLAIN.tone(Tone::Accent), HEART),
];

const CONTACT: &[ContentBlock] = &[
    ContentBlock::new(BlockStyle::HEADING, "# Here's how you can reach me:"),
    ContentBlock::new(BlockStyle::PLAIN, "LinkedIn: https://www.linkedin.com/in/danny-isaac/"),
    ContentBlock::new(BlockStyle::PLAIN, "Github: https://github.com/Dan7n"),
    ContentBlock::new(BlockStyle::PLAIN, "Email: mailto://danny95.nbl@gmail.com"),
];

const TABS: &[Tab] = &[
    Tab { title: "About", shortcut: 'a', blocks: ABOUT },
    Tab { title: "Contact", shortcut: 'c', blocks: CONTACT },
];

static PORTFOLIO: Content =
    Content { banner: BANNER, tabs: TABS, footer: "Press `q` or `Ctrl+C` to quit." };
