//! Three-column diff table layout.

use colored::{ColoredString, Colorize};
use similar::{ChangeTag, TextDiff};

use replaykit_core::DiffStyle;

use crate::renderer::{Delta, DiffRow};
use crate::visible::make_visible;

const SEPARATOR: &str = " | ";

/// A rendered cell: the plain text drives alignment, the styled text is
/// what gets printed.
#[derive(Debug, Clone, Default)]
struct Cell {
    plain: String,
    styled: String,
}

impl Cell {
    fn plain(text: &str) -> Self {
        Self {
            plain: text.to_string(),
            styled: text.to_string(),
        }
    }

    fn styled(plain: String, styled: ColoredString) -> Self {
        Self {
            plain,
            styled: styled.to_string(),
        }
    }

    fn width(&self) -> usize {
        self.plain.chars().count()
    }

    fn padded(&self, width: usize) -> String {
        let pad = width.saturating_sub(self.width());
        format!("{}{}", self.styled, " ".repeat(pad))
    }
}

/// Side-by-side table of aligned diff rows.
#[derive(Debug, Clone)]
pub struct DiffTable {
    rows: Vec<DiffRow>,
    captions: [String; 3],
}

impl DiffTable {
    /// Create a table over aligned rows.
    pub fn new(rows: Vec<DiffRow>) -> Self {
        Self {
            rows,
            captions: Default::default(),
        }
    }

    /// Set the column captions (left, delta, right).
    pub fn captions(mut self, left: &str, delta: &str, right: &str) -> Self {
        self.captions = [left.to_string(), delta.to_string(), right.to_string()];
        self
    }

    /// Rows held by the table.
    pub fn rows(&self) -> &[DiffRow] {
        &self.rows
    }

    /// Lay the table out in the given style.
    pub fn render(&self, style: DiffStyle) -> String {
        let body: Vec<[Cell; 3]> = self.rows.iter().map(|row| render_row(row, style)).collect();
        let header = [
            Cell::plain(&self.captions[0]),
            Cell::plain(&self.captions[1]),
            Cell::plain(&self.captions[2]),
        ];

        let mut widths = [0usize; 3];
        for cells in std::iter::once(&header).chain(body.iter()) {
            for (width, cell) in widths.iter_mut().zip(cells.iter()) {
                *width = (*width).max(cell.width());
            }
        }
        widths[1] = widths[1].max(2);

        let mut out = String::new();
        push_line(&mut out, &header, &widths);
        out.push_str(&format!(
            "{}-+-{}-+-{}\n",
            "-".repeat(widths[0]),
            "-".repeat(widths[1]),
            "-".repeat(widths[2].max(1))
        ));
        for cells in &body {
            push_line(&mut out, cells, &widths);
        }

        out
    }
}

fn push_line(out: &mut String, cells: &[Cell; 3], widths: &[usize; 3]) {
    out.push_str(&cells[0].padded(widths[0]));
    out.push_str(SEPARATOR);
    out.push_str(&cells[1].padded(widths[1]));
    if cells[2].plain.is_empty() {
        out.push_str(SEPARATOR.trim_end());
    } else {
        out.push_str(SEPARATOR);
        out.push_str(&cells[2].styled);
    }
    out.push('\n');
}

fn render_row(row: &DiffRow, style: DiffStyle) -> [Cell; 3] {
    let want = row.want.as_deref().unwrap_or("");
    let got = row.got.as_deref().unwrap_or("");
    let marker = row.delta.marker();

    match style {
        DiffStyle::Color => color_row(row.delta, want, got),
        DiffStyle::Visible => [
            Cell::plain(&visible_side(row.want.as_deref())),
            Cell::plain(marker),
            Cell::plain(&visible_side(row.got.as_deref())),
        ],
        DiffStyle::Plain | DiffStyle::Off => {
            [Cell::plain(want), Cell::plain(marker), Cell::plain(got)]
        }
    }
}

// An absent side stays empty; a present but empty line is shown as an
// explicit empty-line marker so it cannot be mistaken for absence.
fn visible_side(line: Option<&str>) -> String {
    match line {
        None => String::new(),
        Some("") => "∅".to_string(),
        Some(text) => make_visible(text),
    }
}

fn color_row(delta: Delta, want: &str, got: &str) -> [Cell; 3] {
    let marker = delta.marker();
    match delta {
        Delta::Same => [Cell::plain(want), Cell::plain(marker), Cell::plain(got)],
        Delta::Removed => [
            Cell::styled(want.to_string(), want.red()),
            Cell::styled(marker.to_string(), marker.red().bold()),
            Cell::plain(""),
        ],
        Delta::Added => [
            Cell::plain(""),
            Cell::styled(marker.to_string(), marker.green().bold()),
            Cell::styled(got.to_string(), got.green()),
        ],
        Delta::Changed => {
            let (left, right) = highlight_runes(want, got);
            [
                left,
                Cell::styled(marker.to_string(), marker.yellow().bold()),
                right,
            ]
        }
    }
}

/// Highlight the runes that differ between two versions of a line.
fn highlight_runes(want: &str, got: &str) -> (Cell, Cell) {
    let diff = TextDiff::from_chars(want, got);
    let mut left = String::new();
    let mut right = String::new();

    for change in diff.iter_all_changes() {
        let value = change.value();
        match change.tag() {
            ChangeTag::Equal => {
                left.push_str(value);
                right.push_str(value);
            }
            ChangeTag::Delete => left.push_str(&value.red().bold().underline().to_string()),
            ChangeTag::Insert => right.push_str(&value.green().bold().underline().to_string()),
        }
    }

    (
        Cell {
            plain: want.to_string(),
            styled: left,
        },
        Cell {
            plain: got.to_string(),
            styled: right,
        },
    )
}
