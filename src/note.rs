use crate::error::AuditError;
use chrono::Local;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

pub const TIME_FMT: &str = "%d%b%y %H:%M %:z";

/// Separates tags on the `Tags:` header line.
pub const TAG_LIST_SEPARATOR: char = ',';

/// Integer identifier of a note; also the note's file stem.
pub type RecordId = u64;

#[derive(Debug, Clone)]
pub struct Note {
    pub id: RecordId,
    pub title: String,
    pub created: String,
    pub updated: String,
    pub tags: Vec<String>,
    pub body: String,
}

/// Lookup of the tags carried by a record. Fails per call for unknown ids.
pub trait RecordStore {
    fn tags_of(&self, id: RecordId) -> Result<Vec<String>, AuditError>;
}

/// Notes kept as `<id>.md` files in a single directory.
#[derive(Debug, Clone)]
pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn load(&self, id: RecordId) -> io::Result<Note> {
        parse_note(&note_path(&self.dir, id))
    }

    /// Every parseable note in the directory, ordered by id.
    pub fn load_all(&self) -> io::Result<Vec<Note>> {
        let mut notes = Vec::new();
        for path in list_note_files(&self.dir)? {
            match parse_note(&path) {
                Ok(note) => notes.push(note),
                Err(err) => {
                    tracing::debug!(path = %path.display(), %err, "skipping unreadable note");
                }
            }
        }
        notes.sort_by_key(|n| n.id);
        Ok(notes)
    }
}

impl RecordStore for NoteStore {
    fn tags_of(&self, id: RecordId) -> Result<Vec<String>, AuditError> {
        self.load(id).map(|n| n.tags).map_err(|_| AuditError::LookupMiss(id))
    }
}

impl RecordStore for BTreeMap<RecordId, Vec<String>> {
    fn tags_of(&self, id: RecordId) -> Result<Vec<String>, AuditError> {
        self.get(&id).cloned().ok_or(AuditError::LookupMiss(id))
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

pub fn note_path(dir: &Path, id: RecordId) -> PathBuf {
    dir.join(format!("{id}.md"))
}

pub fn timestamp_string() -> String {
    Local::now().format(TIME_FMT).to_string()
}

/// Trim, drop empties and collapse duplicates while keeping first-seen order.
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for t in tags {
        let t = t.as_ref().trim();
        if !t.is_empty() && !out.iter().any(|seen| seen == t) {
            out.push(t.to_string());
        }
    }
    out
}

/// A tag holding the header separator would come back as two tags.
pub fn check_tags(tags: &[String]) -> io::Result<()> {
    match tags.iter().find(|t| t.contains(TAG_LIST_SEPARATOR)) {
        Some(tag) => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Tag {tag:?} contains '{TAG_LIST_SEPARATOR}', which separates tags"),
        )),
        None => Ok(()),
    }
}

pub fn create_note(
    title: String,
    body: String,
    tags: Vec<String>,
    dir: &Path,
) -> io::Result<Note> {
    check_tags(&tags)?;
    let now = timestamp_string();
    let note = Note {
        id: unique_id(dir)?,
        title,
        created: now.clone(),
        updated: now,
        tags: clean_tags(tags),
        body,
    };
    write_note(&note, dir)?;
    Ok(note)
}

pub fn write_note(note: &Note, dir: &Path) -> io::Result<()> {
    let mut body = note.body.trim_end_matches('\n').to_string();
    body.push('\n');
    let tags_line = if note.tags.is_empty() {
        "Tags:".to_string()
    } else {
        let sep = format!("{TAG_LIST_SEPARATOR} ");
        format!("Tags: {}", note.tags.join(sep.as_str()))
    };
    let content = format!(
        "Title: {}\nCreated: {}\nUpdated: {}\n{}\n---\n{}",
        note.title, note.created, note.updated, tags_line, body
    );
    fs::write(note_path(dir, note.id), content)
}

pub fn parse_note(path: &Path) -> io::Result<Note> {
    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<RecordId>().ok())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a note file", path.display()),
            )
        })?;
    let raw = fs::read_to_string(path)?;
    let (header, body) = if let Some(idx) = raw.find("\n---\n") {
        let (h, rest) = raw.split_at(idx);
        (h, &rest[5..])
    } else {
        ("", raw.as_str())
    };

    let mut title = String::new();
    let mut created = String::new();
    let mut updated = String::new();
    let mut tags: Vec<String> = Vec::new();

    for line in header.lines() {
        if let Some(val) = line.strip_prefix("Title:") {
            title = val.trim().to_string();
        } else if let Some(val) = line.strip_prefix("Created:") {
            created = val.trim().to_string();
        } else if let Some(val) = line.strip_prefix("Updated:") {
            updated = val.trim().to_string();
        } else if let Some(val) = line.strip_prefix("Tags:") {
            tags = clean_tags(val.split(TAG_LIST_SEPARATOR));
        }
    }

    Ok(Note { id, title, created, updated, tags, body: body.to_string() })
}

pub fn list_note_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("md")
        {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Millisecond-clock ids, bumped past the last issued id and any file on disk.
pub fn unique_id(dir: &Path) -> io::Result<RecordId> {
    static LAST_ID: OnceLock<Mutex<RecordId>> = OnceLock::new();
    let last = LAST_ID.get_or_init(|| Mutex::new(0));

    let mut guard = last
        .lock()
        .map_err(|_| io::Error::other("id generator poisoned"))?;
    let now = Local::now().timestamp_millis().max(0) as RecordId;
    let mut id = now.max(*guard + 1);
    while note_path(dir, id).exists() {
        id += 1;
    }
    *guard = id;
    Ok(id)
}
