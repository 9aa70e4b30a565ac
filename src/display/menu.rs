// src/display/menu.rs
use crate::display::locale::Locale;
use crate::display::table::render_table;
use crate::processing::dataset::TypedDataset;
use crate::processing::filter::{bounds, distinct_values, filter_in, filter_numeric, filter_range, sort_by, CompareOp};
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Filter,
    Sort,
    Display,
    Reset,
    Exit,
}

impl MenuAction {
    fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(MenuAction::Filter),
            "2" => Some(MenuAction::Sort),
            // Empty input shows the list
            "3" | "" => Some(MenuAction::Display),
            "4" => Some(MenuAction::Reset),
            "5" => Some(MenuAction::Exit),
            _ => None,
        }
    }
}

/// Interactive filter/sort loop over a dataset. The original dataset is never changed;
/// "reset" goes back to it.
pub struct Menu<R, W> {
    input: R,
    output: W,
    locale: Locale,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, locale: Locale) -> Self {
        Self { input, output, locale }
    }

    /// Runs until the user exits or input ends.
    pub fn run(&mut self, original: &TypedDataset) -> io::Result<()> {
        let mut current = original.clone();
        let s = self.locale.strings();

        loop {
            writeln!(self.output, "\n{}", s.menu_title)?;
            for (i, label) in [s.menu_filter, s.menu_sort, s.menu_display, s.menu_reset, s.menu_exit]
                .iter()
                .enumerate()
            {
                writeln!(self.output, "[{}] {}", i + 1, label)?;
            }

            let Some(choice) = self.prompt(s.choose_option)? else {
                break;
            };
            let Some(action) = MenuAction::from_choice(&choice) else {
                writeln!(self.output, "{}", s.invalid_input)?;
                continue;
            };
            tracing::debug!("Menu action: {:?}", action);

            match action {
                MenuAction::Filter => match self.filter(&current)? {
                    Some(filtered) => {
                        current = filtered;
                        self.show(&current)?;
                    }
                    None => writeln!(self.output, "{}", s.invalid_input)?,
                },
                MenuAction::Sort => match self.sort(&current)? {
                    Some(sorted) => {
                        current = sorted;
                        self.show(&current)?;
                    }
                    None => writeln!(self.output, "{}", s.invalid_input)?,
                },
                MenuAction::Display => self.show(&current)?,
                MenuAction::Reset => {
                    current = original.clone();
                    writeln!(self.output, "{}", s.reset_done)?;
                    self.show(&current)?;
                }
                MenuAction::Exit => break,
            }
        }

        writeln!(self.output, "{}", s.goodbye)?;
        Ok(())
    }

    fn show(&mut self, dataset: &TypedDataset) -> io::Result<()> {
        write!(self.output, "{}", render_table(dataset, self.locale))
    }

    /// Prints `label`, reads one line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Reads a number, accepting a decimal comma.
    fn prompt_number(&mut self, label: &str) -> io::Result<Option<f64>> {
        Ok(self
            .prompt(label)?
            .and_then(|v| v.replace(',', ".").parse::<f64>().ok()))
    }

    fn choose_column(&mut self, dataset: &TypedDataset) -> io::Result<Option<String>> {
        for (i, column) in dataset.columns().iter().enumerate() {
            writeln!(self.output, "  [{}] {} ({})", i, self.locale.column_label(column.name()), column.kind())?;
        }
        let choice = self.prompt(self.locale.strings().choose_column)?;
        Ok(choice
            .and_then(|c| c.parse::<usize>().ok())
            .and_then(|i| dataset.columns().get(i))
            .map(|c| c.name().to_string()))
    }

    fn filter(&mut self, dataset: &TypedDataset) -> io::Result<Option<TypedDataset>> {
        let s = self.locale.strings();
        let Some(column) = self.choose_column(dataset)? else {
            return Ok(None);
        };
        let is_numeric = dataset.column(&column).map_or(false, |c| c.kind().is_numeric());

        if is_numeric {
            if let Some((lo, hi)) = bounds(dataset, &column) {
                writeln!(self.output, "  {}: {} .. {}", s.value_range, lo, hi)?;
            }
            let Some(op) = self.prompt(s.choose_operator)? else {
                return Ok(None);
            };
            if op.eq_ignore_ascii_case("range") {
                let Some(min) = self.prompt_number(s.enter_min)? else { return Ok(None) };
                let Some(max) = self.prompt_number(s.enter_max)? else { return Ok(None) };
                return Ok(Some(filter_range(dataset, &column, min, max)));
            }
            let Ok(op) = op.parse::<CompareOp>() else { return Ok(None) };
            let Some(value) = self.prompt_number(s.enter_value)? else { return Ok(None) };
            return Ok(Some(filter_numeric(dataset, &column, op, value)));
        }

        let options = distinct_values(dataset, &column);
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  [{}] {}", i, option)?;
        }
        let Some(answer) = self.prompt(s.choose_values)? else {
            return Ok(None);
        };
        let selected: Option<Vec<String>> = answer
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<usize>().ok().and_then(|i| options.get(i).cloned()))
            .collect();
        Ok(selected.map(|values| filter_in(dataset, &column, &values)))
    }

    fn sort(&mut self, dataset: &TypedDataset) -> io::Result<Option<TypedDataset>> {
        let Some(column) = self.choose_column(dataset)? else {
            return Ok(None);
        };
        let order = self.prompt(self.locale.strings().sort_order)?;
        let ascending = match order.as_deref().map(str::to_lowercase).as_deref() {
            Some("") | Some("asc") => true,
            Some("desc") => false,
            _ => return Ok(None),
        };
        Ok(Some(sort_by(dataset, &column, ascending)))
    }
}
