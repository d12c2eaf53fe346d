use crate::chip::{ChipVisual, REMOVE_MARKER, TagChip};
use yansi::Paint;

pub type Rgb = (u8, u8, u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "day" => Some(Theme::Light),
            "dark" | "night" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Colors for one chip in one visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipStyle {
    pub background: Rgb,
    pub border: Rgb,
    pub text: Rgb,
    pub marker: Option<Rgb>,
    pub strike: bool,
}

const HOVER_RED: Rgb = (232, 17, 35);
const WHITE: Rgb = (255, 255, 255);

/// Style for a chip state under a theme. Pure; the theme comes from outside.
pub fn chip_style(visual: ChipVisual, theme: Theme) -> ChipStyle {
    let (bg_normal, bg_removed, border, text_normal, text_removed) = match theme
    {
        Theme::Dark => (
            (64, 64, 64),
            (45, 45, 45),
            (32, 32, 32),
            (221, 221, 221),
            (102, 102, 102),
        ),
        Theme::Light => (
            (252, 252, 252),
            (224, 224, 224),
            (204, 204, 204),
            (51, 51, 51),
            (136, 136, 136),
        ),
    };

    match visual {
        ChipVisual::Removed => ChipStyle {
            background: bg_removed,
            border,
            text: text_removed,
            marker: None,
            strike: true,
        },
        ChipVisual::Hovered => ChipStyle {
            background: HOVER_RED,
            border: HOVER_RED,
            text: WHITE,
            marker: Some(WHITE),
            strike: false,
        },
        ChipVisual::Normal => ChipStyle {
            background: bg_normal,
            border,
            text: text_normal,
            marker: None,
            strike: false,
        },
    }
}

/// Formatting context passed through rendering pipeline
#[derive(Debug, Clone, Copy)]
pub struct FormatContext {
    pub use_color: bool,
    pub theme: Theme,
}

impl FormatContext {
    pub fn new(use_color: bool, theme: Theme) -> Self {
        Self { use_color, theme }
    }

    pub fn format_id(&self, id: &str) -> String {
        if self.use_color {
            Paint::rgb(id, 108, 112, 134).to_string()
        } else {
            id.to_string()
        }
    }

    pub fn format_tag(&self, tag: &str) -> String {
        if self.use_color {
            let (r, g, b) = crate::tags::color_for_tag(tag);
            Paint::rgb(tag, r, g, b).bold().to_string()
        } else {
            tag.to_string()
        }
    }

    pub fn format_notice(&self, text: &str) -> String {
        if self.use_color {
            Paint::new(text).dim().italic().to_string()
        } else {
            text.to_string()
        }
    }

    /// Paint a chip face. Without color the removed state falls back to
    /// `~label~` so it stays visible.
    pub fn format_chip(&self, chip: &TagChip) -> String {
        let visual = chip.visual();
        if !self.use_color {
            return match visual {
                ChipVisual::Removed => format!("[  ~{}~ ]", chip.label()),
                _ => chip.face(),
            };
        }

        let style = chip_style(visual, self.theme);
        let bg = style.background;
        let marker = match style.marker {
            Some(color) => {
                paint_segment(&REMOVE_MARKER.to_string(), color, bg, true, false)
            }
            None => paint_segment(" ", style.text, bg, false, false),
        };

        format!(
            "{}{}{}{}{}",
            paint_segment("[", style.border, bg, false, false),
            marker,
            paint_segment(" ", style.text, bg, false, false),
            paint_segment(&chip.label(), style.text, bg, false, style.strike),
            paint_segment(" ]", style.border, bg, false, false),
        )
    }
}

fn paint_segment(text: &str, fg: Rgb, bg: Rgb, bold: bool, strike: bool) -> String {
    let mut painted = Paint::rgb(text, fg.0, fg.1, fg.2).on_rgb(bg.0, bg.1, bg.2);
    if bold {
        painted = painted.bold();
    }
    if strike {
        painted = painted.strike();
    }
    painted.to_string()
}
