use crate::error::Result;
use crate::extractor::ImageExporter;
use crate::form::{Dialog, DialogKind, FormState};
use console::{style, Term};
use std::io::{self, BufRead};

/// Walks the user through the export form on the terminal.
///
/// Every prompt shows the current value; pressing Enter keeps it.
pub struct InteractiveSession {
    term: Term,
    use_colors: bool,
}

impl InteractiveSession {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
            use_colors: console::colors_enabled(),
        }
    }

    pub fn run(&self, form: &mut FormState, exporter: &ImageExporter) -> Result<Dialog> {
        self.term.write_line("Export images from DOCX to PNG (named by appearance order)")?;

        let document = self.ask("Word file (.docx)", &form.document_path)?;
        form.choose_document(&document);

        let output_dir = self.ask("Output folder", &form.output_dir)?;
        form.choose_output_dir(&output_dir);

        form.width_text = self.ask("Width (px)", &form.width_text)?;

        let upscale = self.ask("Allow upscale (y/n)", if form.upscale { "y" } else { "n" })?;
        form.upscale = parse_yes_no(&upscale).unwrap_or(form.upscale);

        let dialog = form.submit(exporter);
        self.show_dialog(&dialog)?;
        Ok(dialog)
    }

    fn ask(&self, label: &str, current: &str) -> Result<String> {
        let prompt = if current.is_empty() {
            format!("{}: ", label)
        } else {
            format!("{} [{}]: ", label, current)
        };
        let prompt = if self.use_colors {
            style(prompt).bold().to_string()
        } else {
            prompt
        };
        self.term.write_str(&prompt)?;

        let answer = read_answer(&self.term)?;
        Ok(keep_or_replace(current, &answer))
    }

    fn show_dialog(&self, dialog: &Dialog) -> Result<()> {
        let header = format!("[{}]", dialog.title);
        let header = match (self.use_colors, dialog.kind) {
            (true, DialogKind::Info) => style(header).green().bold().to_string(),
            (true, DialogKind::Error) => style(header).red().bold().to_string(),
            (false, _) => header,
        };
        self.term.write_line(&header)?;
        for line in dialog.message.lines() {
            self.term.write_line(line)?;
        }
        Ok(())
    }
}

impl Default for InteractiveSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Hold the console window open until Enter, as a double-clicked binary would need.
///
/// Does nothing when stdout is not a terminal.
pub fn pause_for_keypress() {
    let term = Term::stdout();
    if !term.is_term() {
        return;
    }
    if term.write_str("Press Enter to exit...").is_ok() {
        let _ = term.read_line();
    }
}

fn read_answer(term: &Term) -> io::Result<String> {
    if term.is_term() {
        return term.read_line();
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

fn keep_or_replace(current: &str, answer: &str) -> String {
    let answer = answer.trim();
    if answer.is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    }
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_keeps_current_value() {
        assert_eq!(keep_or_replace("500", ""), "500");
        assert_eq!(keep_or_replace("500", "   \n"), "500");
        assert_eq!(keep_or_replace("500", " 800\n"), "800");
        assert_eq!(keep_or_replace("", ""), "");
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("Y"), Some(true));
        assert_eq!(parse_yes_no(" yes "), Some(true));
        assert_eq!(parse_yes_no("n"), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }
}
