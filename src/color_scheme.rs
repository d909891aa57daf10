use ratatui::style::{Color, Modifier, Style};

/// Selectable color schemes, cycled with `c`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSchemeId {
    Default = 0,
    Monochrome = 1,
    LightTerminal = 2,
    DarkVivid = 3,
}

impl ColorSchemeId {
    pub fn all() -> &'static [ColorSchemeId] {
        &[
            ColorSchemeId::Default,
            ColorSchemeId::Monochrome,
            ColorSchemeId::LightTerminal,
            ColorSchemeId::DarkVivid,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorSchemeId::Default => "Default",
            ColorSchemeId::Monochrome => "Monochrome",
            ColorSchemeId::LightTerminal => "Light Terminal",
            ColorSchemeId::DarkVivid => "Dark Vivid",
        }
    }

    pub fn from_index(idx: usize) -> Self {
        Self::all().get(idx).copied().unwrap_or(ColorSchemeId::Default)
    }

    pub fn next(&self) -> Self {
        Self::from_index((*self as usize + 1) % Self::all().len())
    }
}

/// Color slots used by the bar view and status footer
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub id: ColorSchemeId,

    // Bars
    pub bar_fill: Color,
    pub bar_empty: Color,
    pub label: Color,
    /// Monochrome has no background colors, so its fill is drawn reversed
    pub fill_modifier: Modifier,

    // Footer
    pub footer_key_fg: Color,
    pub footer_key_bg: Color,
    pub footer_label_fg: Color,
    pub footer_label_bg: Color,
    pub status_live: Color,
    pub status_waiting: Color,
    pub status_closed: Color,
}

impl ColorScheme {
    pub fn from_id(id: ColorSchemeId) -> Self {
        match id {
            ColorSchemeId::Default => Self::default_scheme(),
            ColorSchemeId::Monochrome => Self::monochrome(),
            ColorSchemeId::LightTerminal => Self::light_terminal(),
            ColorSchemeId::DarkVivid => Self::dark_vivid(),
        }
    }

    fn default_scheme() -> Self {
        Self {
            id: ColorSchemeId::Default,
            bar_fill: Color::Green,
            bar_empty: Color::Indexed(236),
            label: Color::White,
            fill_modifier: Modifier::empty(),
            footer_key_fg: Color::Black,
            footer_key_bg: Color::Cyan,
            footer_label_fg: Color::Cyan,
            footer_label_bg: Color::Black,
            status_live: Color::Green,
            status_waiting: Color::Yellow,
            status_closed: Color::Red,
        }
    }

    fn monochrome() -> Self {
        Self {
            id: ColorSchemeId::Monochrome,
            bar_fill: Color::Reset,
            bar_empty: Color::Reset,
            label: Color::Reset,
            fill_modifier: Modifier::REVERSED,
            footer_key_fg: Color::Reset,
            footer_key_bg: Color::Reset,
            footer_label_fg: Color::Reset,
            footer_label_bg: Color::Reset,
            status_live: Color::Reset,
            status_waiting: Color::Reset,
            status_closed: Color::Reset,
        }
    }

    fn light_terminal() -> Self {
        Self {
            id: ColorSchemeId::LightTerminal,
            bar_fill: Color::Indexed(114),
            bar_empty: Color::Indexed(254),
            label: Color::Black,
            fill_modifier: Modifier::empty(),
            footer_key_fg: Color::White,
            footer_key_bg: Color::Blue,
            footer_label_fg: Color::Black,
            footer_label_bg: Color::Indexed(252),
            status_live: Color::Indexed(28),
            status_waiting: Color::Indexed(130),
            status_closed: Color::Red,
        }
    }

    fn dark_vivid() -> Self {
        Self {
            id: ColorSchemeId::DarkVivid,
            bar_fill: Color::Indexed(48),
            bar_empty: Color::Indexed(234),
            label: Color::Indexed(231),
            fill_modifier: Modifier::empty(),
            footer_key_fg: Color::Black,
            footer_key_bg: Color::Indexed(214),
            footer_label_fg: Color::Indexed(214),
            footer_label_bg: Color::Black,
            status_live: Color::Indexed(48),
            status_waiting: Color::Indexed(220),
            status_closed: Color::Indexed(197),
        }
    }

    /// Style for a cell covered by the bar fill
    pub fn filled_style(&self) -> Style {
        Style::default()
            .fg(self.label)
            .bg(self.bar_fill)
            .add_modifier(self.fill_modifier)
    }

    /// Style for the rest of the row
    pub fn empty_style(&self) -> Style {
        Style::default().fg(self.label).bg(self.bar_empty)
    }

    pub fn footer_key_style(&self) -> Style {
        Style::default()
            .fg(self.footer_key_fg)
            .bg(self.footer_key_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn footer_label_style(&self) -> Style {
        Style::default().fg(self.footer_label_fg).bg(self.footer_label_bg)
    }
}
