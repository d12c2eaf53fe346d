use crate::layout::{LayoutItem, Rect, Size};
use crate::tags::abbreviate_tag;
use unicode_width::UnicodeWidthStr;

/// Glyph shown in front of the label while the pointer rests on a chip.
pub const REMOVE_MARKER: char = '✕';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChipState {
    pub tag: String,
    pub count: usize,
    pub active: bool,
    pub removed: bool,
    pub abbreviate: bool,
}

/// Emitted by a chip when the user asks to drop its tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalIntent {
    pub tag: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipVisual {
    Normal,
    Hovered,
    Removed,
}

/// One tag on the audit canvas. Only ever asks for removal; the session
/// decides what that means.
#[derive(Debug, Clone)]
pub struct TagChip {
    state: TagChipState,
    hovered: bool,
    geometry: Option<Rect>,
}

impl TagChip {
    pub fn new(tag: &str, count: usize, abbreviate: bool) -> Self {
        Self {
            state: TagChipState {
                tag: tag.to_string(),
                count,
                active: true,
                removed: false,
                abbreviate,
            },
            hovered: false,
            geometry: None,
        }
    }

    pub fn state(&self) -> &TagChipState {
        &self.state
    }

    pub fn tag(&self) -> &str {
        &self.state.tag
    }

    pub fn count(&self) -> usize {
        self.state.count
    }

    pub fn is_removed(&self) -> bool {
        self.state.removed
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn geometry(&self) -> Option<Rect> {
        self.geometry
    }

    pub fn display_tag(&self) -> String {
        if self.state.abbreviate {
            abbreviate_tag(&self.state.tag)
        } else {
            self.state.tag.clone()
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.display_tag(), self.state.count)
    }

    /// Full tag, whatever the display mode.
    pub fn tooltip(&self) -> &str {
        &self.state.tag
    }

    pub fn set_display_mode(&mut self, abbreviate: bool) {
        self.state.abbreviate = abbreviate;
    }

    pub fn set_active(&mut self, active: bool) {
        self.state.active = active;
        self.hovered = false;
    }

    pub fn set_removed(&mut self) {
        self.state.removed = true;
        self.hovered = false;
    }

    /// Pointer entered. Only a live, active chip lights up.
    pub fn enter(&mut self) {
        if !self.state.removed && self.state.active {
            self.hovered = true;
        }
    }

    pub fn leave(&mut self) {
        self.hovered = false;
    }

    pub fn click(&self) -> Option<RemovalIntent> {
        (!self.state.removed)
            .then(|| RemovalIntent { tag: self.state.tag.clone() })
    }

    pub fn visual(&self) -> ChipVisual {
        if self.state.removed {
            ChipVisual::Removed
        } else if self.hovered {
            ChipVisual::Hovered
        } else {
            ChipVisual::Normal
        }
    }

    /// Unstyled face of the chip. The marker slot is always reserved so the
    /// width does not change on hover.
    pub fn face(&self) -> String {
        let marker = match self.visual() {
            ChipVisual::Hovered => REMOVE_MARKER,
            _ => ' ',
        };
        format!("[{marker} {} ]", self.label())
    }
}

impl LayoutItem for TagChip {
    fn size_hint(&self) -> Size {
        Size::new(self.face().width() as u32, 1)
    }

    fn set_geometry(&mut self, rect: Rect) {
        self.geometry = Some(rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_and_abbreviation() {
        let mut chip = TagChip::new("lang::rust::traits::dyn", 3, false);
        assert_eq!(chip.label(), "lang::rust::traits::dyn (3)");
        chip.set_display_mode(true);
        assert_eq!(chip.label(), "lang::(...)::dyn (3)");
        assert_eq!(chip.tooltip(), "lang::rust::traits::dyn");
        chip.set_display_mode(false);
        assert_eq!(chip.label(), "lang::rust::traits::dyn (3)");
    }

    #[test]
    fn test_short_tags_never_abbreviate() {
        assert_eq!(TagChip::new("a::b", 1, true).label(), "a::b (1)");
        assert_eq!(TagChip::new("a", 2, true).label(), "a (2)");
    }

    #[test]
    fn test_hover_only_while_interactive() {
        let mut chip = TagChip::new("x", 1, false);
        chip.enter();
        assert_eq!(chip.visual(), ChipVisual::Hovered);
        chip.leave();
        assert_eq!(chip.visual(), ChipVisual::Normal);

        chip.set_active(false);
        chip.enter();
        assert_eq!(chip.visual(), ChipVisual::Normal);

        chip.set_active(true);
        chip.set_removed();
        chip.enter();
        assert_eq!(chip.visual(), ChipVisual::Removed);
    }

    #[test]
    fn test_click_emits_until_removed() {
        let mut chip = TagChip::new("x", 1, false);
        assert_eq!(chip.click(), Some(RemovalIntent { tag: "x".to_string() }));
        chip.set_removed();
        assert_eq!(chip.click(), None);
        assert!(chip.is_removed());
    }

    #[test]
    fn test_width_stable_across_hover() {
        let mut chip = TagChip::new("todo", 12, false);
        let before = chip.size_hint();
        chip.enter();
        assert_eq!(chip.face(), "[✕ todo (12) ]");
        assert_eq!(chip.size_hint(), before);
        assert_eq!(before, Size::new(14, 1));
    }

    #[test]
    fn test_wide_labels_measure_in_columns() {
        let chip = TagChip::new("日本", 1, false);
        assert_eq!(chip.face(), "[  日本 (1) ]");
        assert_eq!(chip.size_hint(), Size::new(13, 1));
    }
}
