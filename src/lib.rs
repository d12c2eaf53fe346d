pub mod args;
pub mod audit;
pub mod chip;
pub mod commands;
pub mod config;
pub mod error;
pub mod formatting;
pub mod layout;
pub mod note;
pub mod prefs;
pub mod query;
pub mod session;
pub mod shared;
pub mod tags;

use crate::args::{Selection, parse_selection, split_tags};
use crate::audit::{TerminalView, unique_selection};
use crate::commands::CommandRegistry;
use crate::config::Settings;
use crate::note::{Note, NoteStore, RecordId, create_note, ensure_dir};
use crate::prefs::{DisplayPreferences, FilePreferences, parse_bool};
use crate::query::DerivedQuery;
use crate::session::AuditSession;
use crate::shared::table::{render_notes, render_table};
use std::env;
use std::error::Error;
use std::io;

pub fn entry() -> Result<(), Box<dyn Error>> {
    let settings = Settings::from_env()?;
    config::init_tracing(settings.use_color);

    let registry = commands::builtin();
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help(&registry);
        return Ok(());
    }

    let word = args.remove(0);
    let Some(command) = registry.resolve(&word) else {
        eprintln!("Unknown command: {word}");
        print_help(&registry);
        return Ok(());
    };

    ensure_dir(&settings.notes_dir)?;
    tracing::debug!(command = command.name, dir = %settings.notes_dir.display(), "dispatch");

    match command.name {
        "add" => add_note(args, &settings)?,
        "list" => list_notes(args, &settings)?,
        "search" => search_notes(args, &settings)?,
        "tags" => list_tags(&settings)?,
        "audit" => audit_notes(args, &settings)?,
        "prefs" => preferences(args, &settings)?,
        "path" => println!("{}", settings.notes_dir.display()),
        _ => print_help(&registry),
    }

    Ok(())
}

fn print_help(registry: &CommandRegistry) {
    print!("{}", registry.help_text());
}

fn add_note(args: Vec<String>, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let (tags, mut words) = split_tags(args, "add")?;
    if words.is_empty() {
        return Err("Usage: ta add <title> [body...] [-t <tag>...]".into());
    }
    let title = words.remove(0);
    let note = create_note(title, words.join(" "), tags, &settings.notes_dir)?;
    println!("Added note {} ({})", note.id, note.title);
    Ok(())
}

/// Notes named by id plus, when filters are given, every note passing them.
/// Ids are returned in the order given and may repeat.
fn select_notes(
    store: &NoteStore,
    selection: &Selection,
) -> io::Result<Vec<RecordId>> {
    let mut selected = selection.ids.clone();
    if selection.filters_collection() {
        for note in store.load_all()? {
            if note_matches(&note, selection) {
                selected.push(note.id);
            }
        }
    }
    Ok(selected)
}

fn note_matches(note: &Note, selection: &Selection) -> bool {
    let has_tags = selection.tags.iter().all(|t| note.tags.contains(t));
    let in_query = selection.query.as_ref().is_none_or(|q| q.matches(note.id));
    has_tags && in_query
}

fn print_notes(notes: &[Note], settings: &Settings) {
    if notes.is_empty() {
        println!("No notes found.");
        return;
    }
    println!("{}", render_notes(notes, &settings.format_context()));
}

fn list_notes(args: Vec<String>, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let selection = parse_selection(args, "list")?;
    if !selection.ids.is_empty() {
        return Err("list takes filters only (-t, -q)".into());
    }
    let mut notes = NoteStore::new(&settings.notes_dir).load_all()?;
    notes.retain(|n| note_matches(n, &selection));
    print_notes(&notes, settings);
    Ok(())
}

fn search_notes(args: Vec<String>, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let raw = args.join(" ");
    let query = DerivedQuery::parse(&raw)
        .ok_or_else(|| format!("Unsupported query: {raw}"))?;
    let mut notes = NoteStore::new(&settings.notes_dir).load_all()?;
    notes.retain(|n| query.matches(n.id));
    print_notes(&notes, settings);
    Ok(())
}

fn list_tags(settings: &Settings) -> Result<(), Box<dyn Error>> {
    let store = NoteStore::new(&settings.notes_dir);
    let ids = store.load_all()?.iter().map(|n| n.id).collect();
    let index = tags::aggregate(&ids, &store);
    if index.is_empty() {
        println!("No tags found.");
        return Ok(());
    }
    let ctx = settings.format_context();
    let rows: Vec<Vec<String>> = index
        .iter()
        .map(|(tag, count, _)| vec![ctx.format_tag(tag), count.to_string()])
        .collect();
    println!("{}", render_table(&["Tag", "Notes"], &rows));
    Ok(())
}

fn audit_notes(args: Vec<String>, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let selection = parse_selection(args, "audit")?;
    let store = NoteStore::new(&settings.notes_dir);
    let selected = if selection.is_empty() {
        Vec::new()
    } else {
        select_notes(&store, &selection)?
    };
    let ctx = settings.format_context();
    let records = match unique_selection(&selected) {
        Ok(records) => records,
        Err(err) => {
            println!("{}", ctx.format_notice(&err.to_string()));
            return Ok(());
        }
    };

    let view = TerminalView::new(store.clone(), ctx, io::stdout().lock());
    let prefs = FilePreferences::new(&settings.notes_dir);
    let mut session = AuditSession::new(store, prefs, view);
    session.initialize(records)?;

    audit::run(&mut session, io::stdin().lock(), &ctx, settings.columns)
}

fn preferences(args: Vec<String>, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let mut store = FilePreferences::new(&settings.notes_dir);
    match args.as_slice() {
        [] => {}
        [key, value] if key == "abbreviate" => {
            let abbreviate_tags = parse_bool(value)
                .ok_or_else(|| format!("Expected on|off, got {value}"))?;
            DisplayPreferences { abbreviate_tags }.save(&mut store)?;
        }
        _ => return Err("Usage: ta prefs [abbreviate on|off]".into()),
    }
    let current = DisplayPreferences::load(&store);
    println!(
        "abbreviate_tags: {}",
        if current.abbreviate_tags { "on" } else { "off" }
    );
    tracing::debug!(path = %store.path().display(), "preferences read");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn note(dir: &std::path::Path, title: &str, tags: &[&str]) -> Note {
        create_note(
            title.to_string(),
            String::new(),
            tags.iter().map(|t| t.to_string()).collect(),
            dir,
        )
        .unwrap()
    }

    #[test]
    fn test_select_by_tag_and_ids() {
        let tmp = tempdir().unwrap();
        let a = note(tmp.path(), "a", &["x", "y"]);
        let b = note(tmp.path(), "b", &["y"]);
        let c = note(tmp.path(), "c", &["z"]);
        let store = NoteStore::new(tmp.path());

        let by_tag = Selection { tags: vec!["y".into()], ..Default::default() };
        assert_eq!(select_notes(&store, &by_tag).unwrap(), vec![a.id, b.id]);

        let by_id = Selection { ids: vec![c.id, c.id], ..Default::default() };
        assert_eq!(
            unique_selection(&select_notes(&store, &by_id).unwrap()),
            Ok([c.id].into())
        );

        let all = Selection { all: true, ..Default::default() };
        assert_eq!(select_notes(&store, &all).unwrap().len(), 3);
    }

    #[test]
    fn test_note_matches_query_and_tags() {
        let tmp = tempdir().unwrap();
        let a = note(tmp.path(), "a", &["x"]);
        let selection = Selection {
            tags: vec!["x".into()],
            query: Some(DerivedQuery::MatchNothing),
            ..Default::default()
        };
        assert!(!note_matches(&a, &selection));
        let selection = Selection {
            query: DerivedQuery::parse(&format!("nid:{}", a.id)),
            ..Default::default()
        };
        assert!(note_matches(&a, &selection));
    }
}
