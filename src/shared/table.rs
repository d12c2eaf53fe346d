//! Text layout helpers used by the CLI.
//! ANSI-aware width calculations, simple tables and the chip canvas.

use crate::chip::TagChip;
use crate::formatting::FormatContext;
use crate::note::Note;
use unicode_width::UnicodeWidthChar;

const TITLE_WIDTH: usize = 40;

/// Render a simple text table. Column widths come from the widest cell
/// (header or row), measured without ANSI color codes.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| display_len(h)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_len(cell));
        }
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let header = format_row(&header_cells, &widths);
    let mut out = header.clone();
    out.push('\n');
    out.push_str(&"-".repeat(display_len(&header)));
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    row.iter()
        .zip(widths)
        .map(|(cell, width)| pad_field(cell, *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

/// `Id | Title | Tags` table for a list of notes.
pub fn render_notes(notes: &[Note], ctx: &FormatContext) -> String {
    let rows: Vec<Vec<String>> = notes
        .iter()
        .map(|n| {
            let tags = n
                .tags
                .iter()
                .map(|t| ctx.format_tag(t))
                .collect::<Vec<_>>()
                .join(" ");
            vec![
                ctx.format_id(&n.id.to_string()),
                truncate_with_ellipsis(&n.title, TITLE_WIDTH),
                tags,
            ]
        })
        .collect();
    render_table(&["Id", "Title", "Tags"], &rows)
}

/// Right-pad a field to `target` visible columns.
pub fn pad_field(display: &str, target: usize) -> String {
    let mut out = display.to_string();
    out.push_str(&" ".repeat(target.saturating_sub(display_len(display))));
    out
}

/// Truncate text to a width, appending an ellipsis when needed.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_width - 1).collect();
    out.push('…');
    out
}

/// Terminal columns taken by a string, ignoring ANSI escape sequences.
/// Wide characters count as two columns.
pub fn display_len(s: &str) -> usize {
    let mut len = 0;
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
            continue;
        }
        len += ch.width().unwrap_or(0);
    }
    len
}

/// Paint laid-out chips onto `height` text rows. Chips without a geometry
/// are skipped.
pub fn render_canvas(
    chips: &[TagChip],
    height: u32,
    ctx: &FormatContext,
) -> String {
    let mut lines: Vec<String> = vec![String::new(); height as usize];
    for chip in chips {
        let Some(at) = chip.geometry() else { continue };
        let Some(line) = lines.get_mut(at.y as usize) else { continue };
        let used = display_len(line);
        line.push_str(&" ".repeat((at.x as usize).saturating_sub(used)));
        line.push_str(&ctx.format_chip(chip));
    }
    lines
        .iter()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatting::Theme;
    use crate::layout::{FlowLayout, Margins};

    #[test]
    fn test_display_len_ignores_ansi() {
        assert_eq!(display_len("\x1b[1;31mred\x1b[0m"), 3);
        assert_eq!(display_len("plain"), 5);
    }

    #[test]
    fn test_display_len_counts_wide_chars() {
        assert_eq!(display_len("日本"), 4);
        assert_eq!(display_len("\x1b[1m日\x1b[0mx"), 3);
    }

    #[test]
    fn test_render_notes_rows() {
        let notes = vec![Note {
            id: 7,
            title: "first".to_string(),
            created: String::new(),
            updated: String::new(),
            tags: vec!["x".to_string(), "y".to_string()],
            body: String::new(),
        }];
        let ctx = FormatContext::new(false, Theme::Dark);
        let table = render_notes(&notes, &ctx);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Id | Title | Tags");
        assert_eq!(lines[2], "7  | first | x y");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_with_ellipsis("abc", 4), "abc");
        assert_eq!(truncate_with_ellipsis("abc", 0), "");
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let rows = vec![
            vec!["alpha".to_string(), "3".to_string()],
            vec!["b".to_string(), "12".to_string()],
        ];
        let table = render_table(&["Tag", "Count"], &rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Tag   | Count");
        assert_eq!(lines[2], "alpha | 3");
        assert_eq!(lines[3], "b     | 12");
    }

    #[test]
    fn test_render_canvas_places_rows() {
        let mut layout = FlowLayout::new(1, Margins::new(1, 0, 1, 0));
        for tag in ["alpha", "beta", "gamma"] {
            layout.add(TagChip::new(tag, 1, false));
        }
        let height = layout.set_geometry(crate::layout::Rect::new(0, 0, 34, 0));
        let ctx = FormatContext::new(false, Theme::Dark);
        let canvas = render_canvas(layout.items(), height, &ctx);
        assert_eq!(
            canvas,
            " [  alpha (1) ] [  beta (1) ]\n\n [  gamma (1) ]"
        );
    }
}
