//! Theme support with auto-detection for dark/light terminals.

use dualscan_core::Chain;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Detect the terminal theme based on background luminance.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => {
                tracing::info!("Detected light terminal (luma: {:.2})", luma);
                Theme::Light
            }
            Ok(luma) => {
                tracing::info!("Detected dark terminal (luma: {:.2})", luma);
                Theme::Dark
            }
            Err(e) => {
                tracing::debug!("Could not detect terminal theme: {}, defaulting to dark", e);
                Theme::Dark
            }
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette::dark(),
            Theme::Light => Palette::light(),
        }
    }
}

/// Color palette for the application.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub border: Color,
    pub accent: Color,
    pub muted: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,

    /// Row tint per chain in merged tables.
    pub primary_chain: Color,
    pub secondary_chain: Color,
    /// Rows that arrived with the latest live refresh.
    pub new_head: Color,

    pub selection: Color,
    pub highlight: Color,
    pub tab_active: Color,
    pub tab_inactive: Color,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            bg: Color::Reset,
            border: Color::DarkGray,
            accent: Color::Magenta,
            muted: Color::DarkGray,

            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,

            primary_chain: Color::LightBlue,
            secondary_chain: Color::Rgb(247, 147, 26),
            new_head: Color::LightGreen,

            selection: Color::LightBlue,
            highlight: Color::Yellow,
            tab_active: Color::Cyan,
            tab_inactive: Color::DarkGray,
        }
    }

    /// Darker, more saturated colors for light backgrounds.
    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            bg: Color::Reset,
            border: Color::Gray,
            accent: Color::Rgb(128, 0, 128),
            muted: Color::Gray,

            success: Color::Rgb(0, 128, 0),
            warning: Color::Rgb(184, 134, 11),
            error: Color::Rgb(178, 34, 34),

            primary_chain: Color::Rgb(0, 0, 139),
            secondary_chain: Color::Rgb(176, 96, 0),
            new_head: Color::Rgb(0, 128, 0),

            selection: Color::Rgb(70, 130, 180),
            highlight: Color::Rgb(184, 134, 11),
            tab_active: Color::Rgb(0, 128, 128),
            tab_inactive: Color::Gray,
        }
    }

    pub fn chain(&self, chain: Chain) -> Color {
        match chain {
            Chain::Primary => self.primary_chain,
            Chain::Secondary => self.secondary_chain,
        }
    }
}
