use clap::ValueEnum;
use std::fmt::Display;

/// Where `read_wave` output goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Print a table to the terminal.
    #[default]
    Terminal,
    /// Print one bracketed list per sample, for redirecting to a file.
    Pipe,
}

/// Formats rows of a fixed column width, in either output mode.
#[derive(Clone, Copy, Debug)]
pub struct Table {
    pub mode: OutputMode,
    pub width: usize,
}

impl Table {
    pub const DEFAULT_WIDTH: usize = 20;

    pub const fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            width: Self::DEFAULT_WIDTH,
        }
    }

    /// The column titles, with the table borders above and below in terminal mode.
    pub fn header<T: Display>(&self, titles: &[T]) -> String {
        match self.mode {
            OutputMode::Pipe => list(titles),
            OutputMode::Terminal => {
                let cells: Vec<String> = titles
                    .iter()
                    .map(|title| format!(" {:^width$} ", title.to_string(), width = self.width))
                    .collect();
                [
                    self.border('╭', '┬', '╮', titles.len()),
                    format!("│{}│", cells.join("│")),
                    self.border('├', '┼', '┤', titles.len()),
                ]
                .join("\n")
            }
        }
    }

    pub fn row<T: Display>(&self, values: &[T]) -> String {
        match self.mode {
            OutputMode::Pipe => list(values),
            OutputMode::Terminal => {
                let cells: Vec<String> = values
                    .iter()
                    .map(|value| format!(" {:>width$} ", value.to_string(), width = self.width))
                    .collect();
                format!("│{}│", cells.join("│"))
            }
        }
    }

    fn border(&self, left: char, middle: char, right: char, columns: usize) -> String {
        let line = "─".repeat(self.width + 2);
        let inner = vec![line; columns].join(&middle.to_string());
        format!("{left}{inner}{right}")
    }
}

fn list<T: Display>(values: &[T]) -> String {
    let quoted: Vec<String> = values.iter().map(|value| format!("'{value}'")).collect();
    format!("[{}]", quoted.join(", "))
}
