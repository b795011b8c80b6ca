//! Text vs JSON rendering of command results
//!
//! Command handlers build a report struct and hand it to [`OutputWriter`];
//! they never branch on `--output` themselves.

use std::io::Write;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Writes command reports in the format selected by `--output`.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    /// ```no_run
    /// use gcplog_cli::cli::OutputFormat;
    /// use gcplog_cli::output::OutputWriter;
    ///
    /// let writer = OutputWriter::new(OutputFormat::Json);
    /// ```
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Write `report` to stdout.
    pub fn render<T: Render + Serialize>(&self, report: &T) -> Result<(), CliError> {
        let mut stdout = std::io::stdout().lock();
        self.render_to(&mut stdout, report)?;
        stdout.flush()?;
        Ok(())
    }

    /// Write `report` to `w`.
    ///
    /// JSON output is a single pretty-printed document followed by a newline.
    pub fn render_to<T: Render + Serialize>(
        &self,
        w: &mut dyn Write,
        report: &T,
    ) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => report.render_text(w)?,
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *w, report)?;
                writeln!(w)?;
            }
        }
        Ok(())
    }
}

/// Human-readable rendering, implemented next to `Serialize` on every report.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Summary {
        formatted: usize,
        dropped: usize,
        note: String,
    }

    impl Render for Summary {
        fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
            writeln!(w, "{} formatted, {} dropped", self.formatted, self.dropped)?;
            writeln!(w, "{}", self.note)
        }
    }

    fn summary(note: &str) -> Summary {
        Summary {
            formatted: 3,
            dropped: 1,
            note: note.to_owned(),
        }
    }

    fn render(format: OutputFormat, report: &Summary) -> String {
        let mut buf = Vec::new();
        OutputWriter::new(format)
            .render_to(&mut buf, report)
            .expect("rendering into a Vec cannot fail");
        String::from_utf8(buf).expect("valid UTF-8")
    }

    #[test]
    fn text_delegates_to_render_impl() {
        let output = render(OutputFormat::Text, &summary("ok"));
        assert_eq!(output, "3 formatted, 1 dropped\nok\n");
    }

    #[test]
    fn json_is_one_document_with_trailing_newline() {
        let output = render(OutputFormat::Json, &summary("ok"));
        assert!(output.ends_with("}\n"));

        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["formatted"], 3);
        assert_eq!(parsed["dropped"], 1);
    }

    #[test]
    fn json_escapes_non_ascii_and_quotes_correctly() {
        let output = render(OutputFormat::Json, &summary("zone \"서울\" 🦀"));
        let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
        assert_eq!(parsed["note"], "zone \"서울\" 🦀");
    }
}
