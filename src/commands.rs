//! Command table for the CLI. Every entry point is registered once by name;
//! the shortcut is a second word that resolves to the same command.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub shortcut: Option<&'static str>,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const AUDIT: CommandSpec = CommandSpec {
    name: "audit",
    shortcut: Some("T"),
    usage: "audit [ids...] [-t <tag>...] [-q <query>] [--all]",
    summary: "Audit the tags of the selected notes interactively",
};

const BUILTIN: &[CommandSpec] = &[
    CommandSpec {
        name: "add",
        shortcut: Some("a"),
        usage: "add <title> [body...] [-t <tag>...]",
        summary: "Create a note",
    },
    CommandSpec {
        name: "list",
        shortcut: Some("ls"),
        usage: "list [-t <tag>...] [-q <query>]",
        summary: "List notes, optionally filtered",
    },
    CommandSpec {
        name: "search",
        shortcut: None,
        usage: "search <query>",
        summary: "List notes matching a nid: query",
    },
    CommandSpec {
        name: "tags",
        shortcut: None,
        usage: "tags",
        summary: "Show every tag with its note count",
    },
    CommandSpec {
        name: "prefs",
        shortcut: None,
        usage: "prefs [abbreviate on|off]",
        summary: "Show or change display preferences",
    },
    CommandSpec {
        name: "path",
        shortcut: None,
        usage: "path",
        summary: "Show the notes directory",
    },
    CommandSpec {
        name: "help",
        shortcut: Some("-h"),
        usage: "help",
        summary: "Show this message",
    },
];

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandSpec>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `spec`. Returns false, leaving the table untouched, when the
    /// name is already present.
    pub fn register(&mut self, spec: CommandSpec) -> bool {
        if self.commands.iter().any(|c| c.name == spec.name) {
            return false;
        }
        self.commands.push(spec);
        true
    }

    pub fn resolve(&self, word: &str) -> Option<&CommandSpec> {
        self.commands
            .iter()
            .find(|c| c.name == word)
            .or_else(|| self.commands.iter().find(|c| c.shortcut == Some(word)))
    }

    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn help_text(&self) -> String {
        let mut out = String::from("Tag Audit\nUsage:\n");
        for c in &self.commands {
            let usage = format!("ta {}", c.usage);
            out.push_str(&format!("  {usage:<50}{}", c.summary));
            if let Some(s) = c.shortcut {
                out.push_str(&format!(" (shortcut: {s})"));
            }
            out.push('\n');
        }
        out.push_str(
            "\
Audit session (one command per line):
  x <n|tag>   remove the n-th chip or the named tag, with its notes
  x           remove the hovered chip
  h <n>       hover the n-th chip and show its full tag
  a           toggle tag abbreviation
  r           redraw
  q           quit

Environment:
  TAG_AUDIT_DIR     Notes directory (default: ~/.tag_audit)
  TAG_AUDIT_THEME   Chip palette: dark|light (default: dark)
  TAG_AUDIT_LOG     Log filter, e.g. debug (default: warn)
  NO_COLOR          Disable colors
",
        );
        out
    }
}

pub fn register_audit(registry: &mut CommandRegistry) -> bool {
    registry.register(AUDIT)
}

/// Every command the CLI knows, audit first.
pub fn builtin() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    register_audit(&mut registry);
    for spec in BUILTIN {
        registry.register(*spec);
    }
    registry
}
