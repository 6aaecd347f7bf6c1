use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::task::ViewFilter;
use crate::theme::Theme;
use crate::view::{ERROR_EMPTY_TITLE, Row, ViewModel};

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self { color })
    }

    #[tracing::instrument(skip(self, vm))]
    pub fn print_view(&mut self, vm: &ViewModel, theme: Theme) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();

        writeln!(out)?;
        writeln!(
            out,
            "Filter: {}    Theme: {}",
            self.filter_bar(vm.active_filter, theme),
            theme.as_str()
        )?;

        if vm.error_visible {
            writeln!(out, "{}", self.paint(ERROR_EMPTY_TITLE, tone(theme, Tone::Error)))?;
        }
        writeln!(out)?;

        if let [Row::Placeholder { text }] = vm.rows.as_slice() {
            writeln!(out, "  {}", self.paint(text, tone(theme, Tone::Muted)))?;
        } else {
            self.print_rows(&mut out, vm, theme)?;
        }

        writeln!(out)?;
        if vm.delete_all_visible {
            writeln!(out, "Delete All: 'clear'")?;
        }
        if !vm.add_enabled {
            writeln!(
                out,
                "Adding is paused while a task is edited; type the new title and press Enter."
            )?;
        }

        Ok(())
    }

    pub fn print_help(&mut self) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "add <title>        add a task")?;
        writeln!(out, "done <id>          mark a task as done")?;
        writeln!(out, "undo <id>          reopen a completed task")?;
        writeln!(out, "flag <id>          mark a task important")?;
        writeln!(out, "unflag <id>        unmark an important task")?;
        writeln!(out, "edit <id>          edit a task title inline")?;
        writeln!(out, "save [title]       commit the edit in progress")?;
        writeln!(out, "remove <id>        remove a task")?;
        writeln!(out, "clear              remove every task")?;
        writeln!(out, "filter <name>      all | completed | incomplete | important")?;
        writeln!(out, "theme              toggle the white/black display mode")?;
        writeln!(out, "quit               leave")?;
        Ok(())
    }

    fn print_rows<W: Write>(&self, out: &mut W, vm: &ViewModel, theme: Theme) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "State".to_string(),
            "Title".to_string(),
            "Actions".to_string(),
        ];

        let mut rows = Vec::with_capacity(vm.rows.len());
        for row in &vm.rows {
            let (id, state, title) = match row {
                Row::Placeholder { text } => {
                    rows.push(vec![
                        String::new(),
                        String::new(),
                        self.paint(text, tone(theme, Tone::Muted)),
                        String::new(),
                    ]);
                    continue;
                }
                Row::Editing { id, field } => (
                    *id,
                    self.paint("editing", tone(theme, Tone::Accent)),
                    format!("[{field}]"),
                ),
                Row::Done { id, title } => (
                    *id,
                    self.paint("done", tone(theme, Tone::Done)),
                    self.paint(title, tone(theme, Tone::Done)),
                ),
                Row::Open {
                    id,
                    title,
                    important,
                } => {
                    let state = if *important {
                        self.paint("important", tone(theme, Tone::Flag))
                    } else {
                        String::new()
                    };
                    (*id, state, title.clone())
                }
            };

            rows.push(vec![
                self.paint(&id.to_string(), tone(theme, Tone::Id)),
                state,
                title,
                row.actions().join(" | "),
            ]);
        }

        write_table(out, headers, rows)?;
        Ok(())
    }

    fn filter_bar(&self, active: ViewFilter, theme: Theme) -> String {
        ViewFilter::ALL
            .iter()
            .map(|filter| {
                if *filter == active {
                    self.paint(&format!("[{}]", filter.label()), tone(theme, Tone::Accent))
                } else {
                    filter.label().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Id,
    Done,
    Flag,
    Accent,
    Muted,
    Error,
}

// the black theme swaps to bright variants so rows stay legible
fn tone(theme: Theme, tone: Tone) -> &'static str {
    match (theme, tone) {
        (Theme::White, Tone::Id) => "33",
        (Theme::White, Tone::Done) => "32",
        (Theme::White, Tone::Flag) => "33",
        (Theme::White, Tone::Accent) => "34",
        (Theme::White, Tone::Muted) => "90",
        (Theme::White, Tone::Error) => "31",
        (Theme::Black, Tone::Id) => "93",
        (Theme::Black, Tone::Done) => "92",
        (Theme::Black, Tone::Flag) => "93",
        (Theme::Black, Tone::Accent) => "94",
        (Theme::Black, Tone::Muted) => "37",
        (Theme::Black, Tone::Error) => "91",
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
