//! Interactive audit over a fixed selection of notes.
//!
//! The session keeps the original selection and a shrinking live subset.
//! Removing a tag drops every live note that carries it, rebuilds the tag
//! index from what is left, recreates the chips from scratch and publishes a
//! fresh `nid:` query to the host view.

use crate::chip::TagChip;
use crate::error::AuditError;
use crate::layout::{FlowLayout, Margins, Rect};
use crate::note::{RecordId, RecordStore};
use crate::prefs::{DisplayPreferences, PreferenceStore};
use crate::query::{DerivedQuery, HostView};
use crate::tags::{TagIndex, aggregate};
use std::collections::BTreeSet;

pub const CHIP_SPACING: u32 = 1;
pub const CANVAS_MARGINS: Margins = Margins::new(1, 0, 1, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Ready,
    Closed,
}

/// What a single removal did to the session.
#[derive(Debug, Clone)]
pub struct RemovalOutcome {
    /// The chip that was clicked, struck through.
    pub removed: TagChip,
    pub dropped: BTreeSet<RecordId>,
    /// Tags that disappeared only because all their notes were dropped.
    pub vanished: Vec<String>,
}

pub struct AuditSession<S, P, V> {
    store: S,
    prefs: P,
    view: V,
    state: SessionState,
    original: BTreeSet<RecordId>,
    live: BTreeSet<RecordId>,
    index: TagIndex,
    display: DisplayPreferences,
    chips: FlowLayout<TagChip>,
}

impl<S, P, V> AuditSession<S, P, V>
where
    S: RecordStore,
    P: PreferenceStore,
    V: HostView,
{
    pub fn new(store: S, prefs: P, view: V) -> Self {
        let display = DisplayPreferences::load(&prefs);
        Self {
            store,
            prefs,
            view,
            state: SessionState::Initializing,
            original: BTreeSet::new(),
            live: BTreeSet::new(),
            index: TagIndex::default(),
            display,
            chips: FlowLayout::new(CHIP_SPACING, CANVAS_MARGINS),
        }
    }

    pub fn initialize(
        &mut self,
        records: BTreeSet<RecordId>,
    ) -> Result<(), AuditError> {
        if self.state != SessionState::Initializing {
            return Err(AuditError::NotReady);
        }
        self.original = records.clone();
        self.live = records;
        self.index = aggregate(&self.live, &self.store);
        self.state = SessionState::Ready;
        self.populate();
        self.publish();
        tracing::info!(
            records = self.original.len(),
            tags = self.index.len(),
            "audit session ready"
        );
        Ok(())
    }

    /// Switch label abbreviation for every chip and remember the choice.
    /// A failed write is logged; the new mode still applies here.
    pub fn toggle_abbreviate(
        &mut self,
        abbreviate: bool,
    ) -> Result<(), AuditError> {
        if self.state == SessionState::Closed {
            return Err(AuditError::NotReady);
        }
        self.display.abbreviate_tags = abbreviate;
        if let Err(err) = self.display.save(&mut self.prefs) {
            tracing::warn!(%err, "keeping abbreviation for this session only");
        }
        for chip in self.chips.items_mut() {
            chip.set_display_mode(abbreviate);
        }
        Ok(())
    }

    pub fn remove_tag(
        &mut self,
        tag: &str,
    ) -> Result<RemovalOutcome, AuditError> {
        if self.state != SessionState::Ready {
            return Err(AuditError::NotReady);
        }
        let Some(owners) = self.index.records(tag) else {
            return Err(AuditError::UnknownTag(tag.to_string()));
        };
        let dropped = owners.clone();

        let mut removed = self
            .chips
            .items()
            .iter()
            .find(|c| c.tag() == tag)
            .cloned()
            .unwrap_or_else(|| {
                TagChip::new(tag, dropped.len(), self.display.abbreviate_tags)
            });
        removed.set_removed();

        self.live.retain(|id| !dropped.contains(id));
        let before = std::mem::take(&mut self.index);
        self.index = aggregate(&self.live, &self.store);
        let vanished = before
            .tags()
            .filter(|t| *t != tag && !self.index.contains(t))
            .map(str::to_string)
            .collect();

        self.populate();
        self.publish();
        tracing::info!(
            tag,
            dropped = dropped.len(),
            live = self.live.len(),
            "removed tag"
        );
        Ok(RemovalOutcome { removed, dropped, vanished })
    }

    /// Click the chip at `index`. A removed chip ignores the click.
    pub fn click(
        &mut self,
        index: usize,
    ) -> Result<Option<RemovalOutcome>, AuditError> {
        let chip =
            self.chips.item_at(index).ok_or(AuditError::UnknownChip(index))?;
        match chip.click() {
            Some(intent) => self.remove_tag(&intent.tag).map(Some),
            None => Ok(None),
        }
    }

    /// Move the pointer onto the chip at `index`.
    pub fn hover(&mut self, index: usize) -> Result<(), AuditError> {
        if index >= self.chips.len() {
            return Err(AuditError::UnknownChip(index));
        }
        for (i, chip) in self.chips.items_mut().iter_mut().enumerate() {
            if i == index {
                chip.enter();
            } else {
                chip.leave();
            }
        }
        Ok(())
    }

    pub fn leave(&mut self) {
        for chip in self.chips.items_mut() {
            chip.leave();
        }
    }

    pub fn hovered(&self) -> Option<&TagChip> {
        self.chips.items().iter().find(|c| c.is_hovered())
    }

    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Closed;
            tracing::info!(live = self.live.len(), "audit session closed");
        }
    }

    /// Lay the chips out for a canvas `width` columns wide.
    pub fn arrange(&mut self, width: u32) -> u32 {
        self.chips.set_geometry(Rect::new(0, 0, width, 0))
    }

    pub fn height_for_width(&self, width: u32) -> u32 {
        self.chips.height_for_width(width)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn original_records(&self) -> &BTreeSet<RecordId> {
        &self.original
    }

    pub fn live_records(&self) -> &BTreeSet<RecordId> {
        &self.live
    }

    pub fn index(&self) -> &TagIndex {
        &self.index
    }

    pub fn chips(&self) -> &[TagChip] {
        self.chips.items()
    }

    pub fn chip_for(&self, tag: &str) -> Option<&TagChip> {
        self.chips.items().iter().find(|c| c.tag() == tag)
    }

    pub fn abbreviate(&self) -> bool {
        self.display.abbreviate_tags
    }

    pub fn query(&self) -> DerivedQuery {
        DerivedQuery::for_records(&self.live)
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn prefs(&self) -> &P {
        &self.prefs
    }

    /// Drop every chip and build one per indexed tag, in tag order.
    fn populate(&mut self) {
        let abbreviate = self.display.abbreviate_tags;
        self.chips.clear();
        for (tag, count, _) in self.index.iter() {
            self.chips.add(TagChip::new(tag, count, abbreviate));
        }
    }

    fn publish(&mut self) {
        let query = DerivedQuery::for_records(&self.live);
        tracing::debug!(%query, "publishing query");
        self.view.publish_query(&query);
    }
}
