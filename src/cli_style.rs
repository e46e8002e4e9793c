//! Terminal rendering for the `mood-dataset` binary.

use crate::mood::MoodLabel;
use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use unicode_width::UnicodeWidthStr;

const SECTION_WIDTH: usize = 60;
const BAR_WIDTH: usize = 30;

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    let heading = Style::new()
        .bold()
        .underline()
        .fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
    let good = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    let bad = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Red)));

    Styles::styled()
        .usage(heading)
        .header(heading)
        .literal(good)
        .valid(good)
        .invalid(bad)
        .error(bad)
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Palette
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const CYAN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 255,
    };
    pub const PURPLE: Color = Color::Rgb {
        r: 180,
        g: 100,
        b: 255,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 136,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const BLUE: Color = Color::Rgb {
        r: 100,
        g: 149,
        b: 237,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

/// One color per mood, used for bars and table cells.
pub fn mood_color(mood: MoodLabel) -> CtColor {
    match mood {
        MoodLabel::Calm => colors::BLUE,
        MoodLabel::Happy => colors::GREEN,
        MoodLabel::Sad => colors::PURPLE,
        MoodLabel::Tense => colors::RED,
    }
}

mod box_chars {
    pub const SINGLE_HORIZONTAL: &str = "─";
    pub const SINGLE_VERTICAL: &str = "│";

    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";

    pub const T_LEFT: &str = "├";
    pub const T_RIGHT: &str = "┤";
    pub const T_TOP: &str = "┬";
    pub const T_BOTTOM: &str = "┴";
    pub const CROSS: &str = "┼";

    pub const BULLET: &str = "●";
    pub const BULLET_EMPTY: &str = "○";
    pub const DIAMOND: &str = "◆";
    pub const CHECK: &str = "✓";
    pub const BLOCK: &str = "█";
    pub const SHADE: &str = "░";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.to_string().with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::ORANGE).bold(),
        message.with(colors::ORANGE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Sections
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_section_header(title: &str) {
    let title_len = title.width();
    let left = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;
    let right = SECTION_WIDTH.saturating_sub(title_len + 4 + left);

    println!();
    println!(
        "{}{} {} {}{}",
        box_chars::ROUND_TOP_LEFT.with(colors::CYAN),
        box_chars::SINGLE_HORIZONTAL.repeat(left).with(colors::CYAN),
        title.with(colors::CYAN).bold().attribute(Attribute::Italic),
        box_chars::SINGLE_HORIZONTAL.repeat(right).with(colors::CYAN),
        box_chars::ROUND_TOP_RIGHT.with(colors::CYAN)
    );
}

pub fn print_section_footer() {
    println!(
        "{}{}{}",
        box_chars::ROUND_BOTTOM_LEFT.with(colors::CYAN),
        box_chars::SINGLE_HORIZONTAL
            .repeat(SECTION_WIDTH)
            .with(colors::CYAN),
        box_chars::ROUND_BOTTOM_RIGHT.with(colors::CYAN)
    );
    println!();
}

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::PURPLE),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn print_key_value_highlight(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::DIAMOND.with(colors::PURPLE),
        format!("{}:", key).with(colors::CYAN).bold(),
        value.with(colors::GREEN).bold()
    );
}

pub fn print_empty_list(message: &str) {
    println!(
        "  {} {}",
        box_chars::BULLET_EMPTY.with(colors::DIM),
        message.with(colors::DIM).attribute(Attribute::Italic)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Class Distribution
// ═══════════════════════════════════════════════════════════════════════════════

/// Filled cells of a bar `BAR_WIDTH` wide showing `count` out of `max`.
fn bar_cells(count: usize, max: usize) -> usize {
    if max == 0 {
        return 0;
    }
    (count * BAR_WIDTH).div_ceil(max).min(BAR_WIDTH)
}

/// One line per mood: label, bar scaled to the largest class, count.
pub fn print_mood_bar(mood: MoodLabel, count: usize, max: usize) {
    let filled = bar_cells(count, max);
    println!(
        "  {} {}{} {}",
        format!("{:<6}", mood.as_str())
            .with(mood_color(mood))
            .bold(),
        box_chars::BLOCK.repeat(filled).with(mood_color(mood)),
        box_chars::SHADE
            .repeat(BAR_WIDTH - filled)
            .with(colors::DIM),
        count.to_string().with(colors::WHITE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table Display
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    col_widths: Vec<usize>,
}

impl TableBuilder {
    pub fn new(headers: Vec<&str>) -> Self {
        let col_widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
        TableBuilder {
            headers: headers.into_iter().map(String::from).collect(),
            rows: Vec::new(),
            col_widths,
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = self.col_widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
        self.rows.push(row);
    }

    fn print_border(&self, left: &str, junction: &str, right: &str) {
        let segments: Vec<String> = self
            .col_widths
            .iter()
            .map(|width| box_chars::SINGLE_HORIZONTAL.repeat(width + 2))
            .collect();
        println!(
            "{}{}{}",
            left.with(colors::CYAN),
            segments.join(junction).with(colors::CYAN),
            right.with(colors::CYAN)
        );
    }

    fn print_cells(&self, cells: &[String], color: CtColor, bold: bool) {
        print!("{}", box_chars::SINGLE_VERTICAL.with(colors::CYAN));
        for (i, cell) in cells.iter().enumerate() {
            let width = self.col_widths.get(i).copied().unwrap_or(0);
            let padding = width.saturating_sub(cell.width());
            let styled = cell.clone().with(color);
            let styled = if bold { styled.bold() } else { styled };
            print!(" {}{} ", styled, " ".repeat(padding));
            print!("{}", box_chars::SINGLE_VERTICAL.with(colors::CYAN));
        }
        println!();
    }

    pub fn print(&self) {
        self.print_border(
            box_chars::ROUND_TOP_LEFT,
            box_chars::T_TOP,
            box_chars::ROUND_TOP_RIGHT,
        );
        self.print_cells(&self.headers, colors::CYAN, true);
        self.print_border(box_chars::T_LEFT, box_chars::CROSS, box_chars::T_RIGHT);
        for row in &self.rows {
            self.print_cells(row, colors::WHITE, false);
        }
        self.print_border(
            box_chars::ROUND_BOTTOM_LEFT,
            box_chars::T_BOTTOM,
            box_chars::ROUND_BOTTOM_RIGHT,
        );
    }
}
