//! Terminal front end for an audit session: reads one command per line,
//! redraws the chip canvas and prints the browser query after each change.

use crate::error::AuditError;
use crate::formatting::FormatContext;
use crate::note::{Note, NoteStore, RecordId, RecordStore};
use crate::prefs::PreferenceStore;
use crate::query::{DerivedQuery, HostView};
use crate::session::{AuditSession, RemovalOutcome};
use crate::shared::table::{render_canvas, render_notes};
use std::collections::BTreeSet;
use std::error::Error;
use std::io::{self, BufRead, Write};

/// Browser stand-in: prints each published query followed by the notes it
/// matches. Everything the session shows goes through the same writer.
pub struct TerminalView<W> {
    store: NoteStore,
    ctx: FormatContext,
    out: W,
}

impl<W: Write> TerminalView<W> {
    pub fn new(store: NoteStore, ctx: FormatContext, out: W) -> Self {
        Self { store, ctx, out }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    fn matching_notes(&self, query: &DerivedQuery) -> Vec<Note> {
        match query {
            DerivedQuery::MatchNothing => Vec::new(),
            DerivedQuery::Ids(ids) => {
                ids.iter().filter_map(|id| self.store.load(*id).ok()).collect()
            }
        }
    }
}

impl<W: Write> HostView for TerminalView<W> {
    fn publish_query(&mut self, query: &DerivedQuery) {
        let notes = self.matching_notes(query);
        let mut text = format!("Search: {query} ({} note(s))", notes.len());
        if !notes.is_empty() {
            text.push('\n');
            text.push_str(&render_notes(&notes, &self.ctx));
        }
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::warn!(%err, "could not print search results");
        }
    }
}

/// Audit session whose host view is the terminal.
pub type TerminalSession<S, P, W> = AuditSession<S, P, TerminalView<W>>;

/// One parsed line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// A displayed tag, or failing that a 1-based chip position.
    Remove(String),
    RemoveHovered,
    Hover(usize),
    ToggleAbbreviate,
    Redraw,
    Help,
    Quit,
}

impl Action {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, arg) = match line.split_once(char::is_whitespace) {
            Some((w, a)) => (w, a.trim()),
            None => (line, ""),
        };
        match (word, arg) {
            ("x" | "remove", "") => Ok(Action::RemoveHovered),
            ("x" | "remove", target) => Ok(Action::Remove(target.to_string())),
            ("h" | "hover", n) => n
                .parse::<usize>()
                .map(Action::Hover)
                .map_err(|_| "Usage: h <n>".to_string()),
            ("a" | "abbreviate", "") => Ok(Action::ToggleAbbreviate),
            ("r" | "", "") => Ok(Action::Redraw),
            ("?" | "help", "") => Ok(Action::Help),
            ("q" | "quit", "") => Ok(Action::Quit),
            _ => Err(format!("Unknown command: {line}")),
        }
    }
}

const SESSION_HELP: &str = "x <tag|n> remove | x remove hovered | h <n> hover | a abbreviate | r redraw | q quit";

/// Deduplicate the selection. An empty selection never opens a session.
pub fn unique_selection(
    selected: &[RecordId],
) -> Result<BTreeSet<RecordId>, AuditError> {
    let ids: BTreeSet<RecordId> = selected.iter().copied().collect();
    if ids.is_empty() {
        return Err(AuditError::EmptySelection);
    }
    Ok(ids)
}

/// Drive `session` from `input` until `q` or end of input.
pub fn run<S, P, W, R>(
    session: &mut TerminalSession<S, P, W>,
    input: R,
    ctx: &FormatContext,
    width: u32,
) -> Result<(), Box<dyn Error>>
where
    S: RecordStore,
    P: PreferenceStore,
    W: Write,
    R: BufRead,
{
    draw(session, ctx, width)?;
    for line in input.lines() {
        let line = line?;
        let action = match Action::parse(&line) {
            Ok(action) => action,
            Err(msg) => {
                writeln!(session.view_mut().out(), "{msg}")?;
                continue;
            }
        };
        match apply(session, action, ctx) {
            Ok(Step::Quit) => break,
            Ok(Step::Redraw) => draw(session, ctx, width)?,
            Ok(Step::Stay) => {}
            Err(err) => {
                let msg = describe(err.as_ref());
                writeln!(session.view_mut().out(), "{msg}")?;
            }
        }
    }
    session.close();
    let summary = format!(
        "Kept {} of {} note(s): {}",
        session.live_records().len(),
        session.original_records().len(),
        session.query()
    );
    let out = session.view_mut().out();
    writeln!(out, "{summary}")?;
    out.flush()?;
    Ok(())
}

enum Step {
    Redraw,
    Stay,
    Quit,
}

fn apply<S, P, W>(
    session: &mut TerminalSession<S, P, W>,
    action: Action,
    ctx: &FormatContext,
) -> Result<Step, Box<dyn Error>>
where
    S: RecordStore,
    P: PreferenceStore,
    W: Write,
{
    match action {
        Action::Remove(target) => {
            let index = resolve_target(session, target)?;
            remove_at(session, index, ctx)?;
            Ok(Step::Redraw)
        }
        Action::RemoveHovered => {
            let Some(index) = session.chips().iter().position(|c| c.is_hovered())
            else {
                writeln!(
                    session.view_mut().out(),
                    "Hover a chip first (h <n>) or name one (x <tag|n>)"
                )?;
                return Ok(Step::Stay);
            };
            remove_at(session, index, ctx)?;
            Ok(Step::Redraw)
        }
        Action::Hover(n) => {
            let index = position(n)?;
            session.hover(index)?;
            if let Some(tooltip) = session.hovered().map(|c| c.tooltip().to_string()) {
                writeln!(session.view_mut().out(), "{}", ctx.format_notice(&tooltip))?;
            }
            Ok(Step::Redraw)
        }
        Action::ToggleAbbreviate => {
            let next = !session.abbreviate();
            session.toggle_abbreviate(next)?;
            writeln!(
                session.view_mut().out(),
                "Abbreviation {}",
                if next { "on" } else { "off" }
            )?;
            Ok(Step::Redraw)
        }
        Action::Redraw => Ok(Step::Redraw),
        Action::Help => {
            writeln!(session.view_mut().out(), "{SESSION_HELP}")?;
            Ok(Step::Stay)
        }
        Action::Quit => Ok(Step::Quit),
    }
}

/// A displayed tag wins over a position, so numeric tags stay removable.
fn resolve_target<S, P, V>(
    session: &AuditSession<S, P, V>,
    target: String,
) -> Result<usize, Box<dyn Error>>
where
    S: RecordStore,
    P: PreferenceStore,
    V: HostView,
{
    if let Some(index) = session.chips().iter().position(|c| c.tag() == target) {
        return Ok(index);
    }
    match target.parse::<usize>() {
        Ok(n) => Ok(position(n)?),
        Err(_) => Err(AuditError::UnknownTag(target).into()),
    }
}

fn remove_at<S, P, W>(
    session: &mut TerminalSession<S, P, W>,
    index: usize,
    ctx: &FormatContext,
) -> Result<(), Box<dyn Error>>
where
    S: RecordStore,
    P: PreferenceStore,
    W: Write,
{
    if let Some(outcome) = session.click(index)? {
        let report = removal_report(&outcome, ctx);
        writeln!(session.view_mut().out(), "{report}")?;
    }
    Ok(())
}

fn removal_report(outcome: &RemovalOutcome, ctx: &FormatContext) -> String {
    let mut report = format!(
        "Removed {} dropping {} note(s)",
        ctx.format_chip(&outcome.removed),
        outcome.dropped.len()
    );
    if !outcome.vanished.is_empty() {
        report.push_str(&format!("\nAlso cleared: {}", outcome.vanished.join(", ")));
    }
    report
}

fn draw<S, P, W>(
    session: &mut TerminalSession<S, P, W>,
    ctx: &FormatContext,
    width: u32,
) -> io::Result<()>
where
    S: RecordStore,
    P: PreferenceStore,
    W: Write,
{
    let text = if session.chips().is_empty() {
        ctx.format_notice("No tags left.")
    } else {
        let height = session.arrange(width);
        let canvas = render_canvas(session.chips(), height, ctx);
        let numbered = session
            .chips()
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}={}", i + 1, c.display_tag()))
            .collect::<Vec<_>>()
            .join("  ");
        format!("{canvas}\n{}", ctx.format_notice(&numbered))
    };
    writeln!(session.view_mut().out(), "{text}")
}

fn position(n: usize) -> Result<usize, String> {
    n.checked_sub(1).ok_or_else(|| "No chip at position 0".to_string())
}

/// Position errors are reported 1-based, the way the user typed them.
fn describe(err: &(dyn Error + 'static)) -> String {
    match err.downcast_ref::<AuditError>() {
        Some(AuditError::UnknownChip(index)) => {
            format!("No chip at position {}", index + 1)
        }
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::Theme;
    use crate::note::write_note;
    use crate::prefs::MemoryPreferences;
    use std::path::Path;
    use tempfile::tempdir;

    type Session = TerminalSession<NoteStore, MemoryPreferences, Vec<u8>>;

    fn plain() -> FormatContext {
        FormatContext::new(false, Theme::Dark)
    }

    /// Notes are `(id, title, space-separated tags)`.
    fn session(dir: &Path, notes: &[(RecordId, &str, &str)]) -> Session {
        for (id, title, tags) in notes {
            let note = Note {
                id: *id,
                title: title.to_string(),
                created: String::new(),
                updated: String::new(),
                tags: tags.split_whitespace().map(str::to_string).collect(),
                body: String::new(),
            };
            write_note(&note, dir).unwrap();
        }
        let store = NoteStore::new(dir);
        let view = TerminalView::new(store.clone(), plain(), Vec::new());
        let mut s = AuditSession::new(store, MemoryPreferences::default(), view);
        s.initialize(notes.iter().map(|(id, _, _)| *id).collect()).unwrap();
        s
    }

    fn scenario(dir: &Path) -> Session {
        session(dir, &[(1, "first", "x y"), (2, "second", "y"), (3, "third", "z")])
    }

    fn drive(session: &mut Session, script: &str) -> String {
        run(session, script.as_bytes(), &plain(), 80).unwrap();
        String::from_utf8(session.view().get_ref().clone()).unwrap()
    }

    #[test]
    fn test_parse_actions() {
        assert_eq!(Action::parse("x 2"), Ok(Action::Remove("2".into())));
        assert_eq!(Action::parse("x a::b"), Ok(Action::Remove("a::b".into())));
        assert_eq!(Action::parse(" x "), Ok(Action::RemoveHovered));
        assert_eq!(Action::parse("h 3"), Ok(Action::Hover(3)));
        assert_eq!(Action::parse("a"), Ok(Action::ToggleAbbreviate));
        assert_eq!(Action::parse(""), Ok(Action::Redraw));
        assert_eq!(Action::parse("q"), Ok(Action::Quit));
        assert!(Action::parse("h two").is_err());
        assert!(Action::parse("zap").is_err());
    }

    #[test]
    fn test_unique_selection() {
        assert_eq!(unique_selection(&[]), Err(AuditError::EmptySelection));
        assert_eq!(unique_selection(&[3, 1, 3]), Ok(BTreeSet::from([1, 3])));
    }

    #[test]
    fn test_search_lists_matching_notes() {
        let tmp = tempdir().unwrap();
        let mut s = scenario(tmp.path());
        let out = drive(&mut s, "x y\n");

        let (initial, after) = out.split_once("Search: nid:3 (1 note(s))").unwrap();
        assert!(initial.contains("Search: nid:1,2,3 (3 note(s))"));
        assert!(initial.contains("1  | first  | x y"));
        assert!(initial.contains("2  | second | y"));
        assert!(after.contains("3  | third | z"));
        assert!(!after.contains("first"));
    }

    #[test]
    fn test_remove_by_tag_reports_side_effects() {
        let tmp = tempdir().unwrap();
        let mut s = scenario(tmp.path());
        let out = drive(&mut s, "x y\nq\n");
        assert!(out.contains(" [  x (1) ] [  y (2) ] [  z (1) ]"));
        assert!(out.contains("Removed [  ~y (2)~ ] dropping 2 note(s)"));
        assert!(out.contains("Also cleared: x"));
        assert!(out.ends_with("Kept 1 of 3 note(s): nid:3\n"));
    }

    #[test]
    fn test_numeric_tag_is_removed_by_name() {
        let tmp = tempdir().unwrap();
        let mut s = session(tmp.path(), &[(1, "year", "2024"), (2, "other", "x")]);
        let out = drive(&mut s, "x 2024\n");
        assert!(out.contains("Removed [  ~2024 (1)~ ] dropping 1 note(s)"));
        assert!(out.contains("Kept 1 of 2 note(s): nid:2"));
    }

    #[test]
    fn test_number_falls_back_to_position() {
        let tmp = tempdir().unwrap();
        let mut s = session(tmp.path(), &[(1, "year", "2024"), (2, "other", "x")]);
        let out = drive(&mut s, "x 2\n");
        assert!(out.contains("Removed [  ~x (1)~ ]"));
        assert!(out.contains("Kept 1 of 2 note(s): nid:1"));
    }

    #[test]
    fn test_hover_then_remove_hovered() {
        let tmp = tempdir().unwrap();
        let mut s = scenario(tmp.path());
        let out = drive(&mut s, "h 3\nx\n");
        assert!(out.contains("[✕ z (1) ]"));
        assert!(out.contains("Removed [  ~z (1)~ ]"));
        assert!(out.contains("Kept 2 of 3 note(s): nid:1,2"));
    }

    #[test]
    fn test_bad_positions_are_reported() {
        let tmp = tempdir().unwrap();
        let mut s = scenario(tmp.path());
        let out = drive(&mut s, "x 9\nh 0\nx\nx nope\n");
        assert!(out.contains("No chip at position 9"));
        assert!(out.contains("No chip at position 0"));
        assert!(out.contains("Hover a chip first"));
        assert!(out.contains("Tag nope is not displayed"));
        assert_eq!(s.live_records().len(), 3);
    }

    #[test]
    fn test_remove_everything() {
        let tmp = tempdir().unwrap();
        let mut s = scenario(tmp.path());
        let out = drive(&mut s, "x 2\nx 1\n");
        assert!(out.contains("Search: nid:0 (0 note(s))"));
        assert!(out.contains("No tags left."));
        assert!(out.contains("Kept 0 of 3 note(s): nid:0"));
    }
}
