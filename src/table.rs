use console::{Alignment, Style};

/// Rows of cells rendered as left-aligned columns. Widths are measured on the
/// visible text, escape codes never count towards them.
pub struct Table {
    ncol: usize,
    rows: Vec<(Vec<String>, Option<Style>)>,
}

impl Table {
    const GAP: usize = 2;

    pub fn with_capacity(size: usize) -> Table {
        Table {
            ncol: 0,
            rows: Vec::with_capacity(size),
        }
    }

    /// Rows may have fewer cells than the widest row.
    pub fn add(&mut self, row: Vec<String>, style: Option<Style>) {
        if row.len() > self.ncol {
            self.ncol = row.len();
        }
        self.rows.push((row, style));
    }

    pub fn render(self) -> Vec<String> {
        let mut pads = vec![0; self.ncol];
        for (row, _) in self.rows.iter() {
            for (i, cell) in row.iter().enumerate() {
                let width = console::measure_text_width(cell);
                if width > pads[i] {
                    pads[i] = width;
                }
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len());
        for (row, style) in self.rows {
            let mut line = String::new();
            for (i, cell) in row.iter().enumerate() {
                let pad = pads[i] + Self::GAP;
                line.push_str(&console::pad_str(cell, pad, Alignment::Left, None));
            }
            let line = line.trim_end().to_string();
            lines.push(match style {
                Some(style) => style.apply_to(line).to_string(),
                None => line,
            });
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| cell.to_string()).collect()
    }

    #[test]
    fn test_render() {
        let mut table = Table::with_capacity(3);
        table.add(row(&["#1", "main", "passed"]), None);
        table.add(row(&["#10", "feature", "failed"]), None);
        table.add(row(&["#100", "x"]), None);

        assert_eq!(
            table.render(),
            vec![
                "#1    main     passed",
                "#10   feature  failed",
                "#100  x",
            ]
        );
    }

    #[test]
    fn test_render_styled() {
        let mut table = Table::with_capacity(1);
        table.add(
            row(&["#1", "main"]),
            Some(Style::new().red().force_styling(true)),
        );
        let lines = table.render();
        assert_eq!(lines.len(), 1);
        assert_eq!(console::strip_ansi_codes(&lines[0]), "#1  main");
        assert!(lines[0].starts_with('\u{1b}'));
    }
}
