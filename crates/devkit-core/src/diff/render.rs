use super::{DisplayLine, LineKind, SideBySide};

const COLOR_RESET: &str = "\u{1b}[0m";
const COLOR_RED: &str = "\u{1b}[31m";
const COLOR_GREEN: &str = "\u{1b}[32m";
const NUMBER_WIDTH: usize = 4;
const DEFAULT_WIDTH: usize = 40;
const EOF_NEWLINE_NOTE: &str = "\\ newline at end of file differs";

/// Controls how a [`SideBySide`] view is printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderConfig {
    color: bool,
    width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { color: false, width: DEFAULT_WIDTH }
    }
}

impl RenderConfig {
    /// Constructs a configuration with default settings (no ANSI color).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables ANSI color output.
    #[must_use]
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.color = enabled;
        self
    }

    /// Sets the text width of each column; longer lines are cut.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Indicates whether color output is enabled.
    #[must_use]
    pub fn color_enabled(self) -> bool {
        self.color
    }

    /// Column text width.
    #[must_use]
    pub fn width(self) -> usize {
        self.width
    }
}

impl SideBySide {
    /// Renders both columns next to each other, one row per line.
    ///
    /// A final `\ newline at end of file differs` line follows the rows when
    /// only one text ends with a newline.
    ///
    /// ```
    /// # use devkit_core::diff::{compute_side_by_side, RenderConfig};
    /// let view = compute_side_by_side("a\nb", "a\nc");
    /// let out = view.render(&RenderConfig::default().with_width(3));
    /// assert_eq!(out, "   1   a   |    1   a\n   2 - b   |    2 + c\n");
    /// ```
    #[must_use]
    pub fn render(&self, config: &RenderConfig) -> String {
        let mut output = String::new();
        for (left, right) in self.rows() {
            let row = format!("{} | {}", render_cell(left, config), render_cell(right, config));
            output.push_str(row.trim_end());
            output.push('\n');
        }
        if self.newline_at_eof_changed {
            output.push_str(EOF_NEWLINE_NOTE);
            output.push('\n');
        }
        output
    }
}

fn render_cell(line: &DisplayLine, config: &RenderConfig) -> String {
    let number = match line.number {
        Some(number) => format!("{number:>NUMBER_WIDTH$}"),
        None => " ".repeat(NUMBER_WIDTH),
    };
    let (marker, color) = match line.kind {
        LineKind::Added => ('+', Some(COLOR_GREEN)),
        LineKind::Removed => ('-', Some(COLOR_RED)),
        LineKind::Unchanged | LineKind::Placeholder => (' ', None),
    };
    let body = format!("{marker} {}", fit(&line.text, config.width));
    match color {
        Some(color) if config.color_enabled() => format!("{number} {color}{body}{COLOR_RESET}"),
        _ => format!("{number} {body}"),
    }
}

fn fit(text: &str, width: usize) -> String {
    let mut cell: String = text.chars().take(width).collect();
    let used = cell.chars().count();
    cell.push_str(&" ".repeat(width - used));
    cell
}
