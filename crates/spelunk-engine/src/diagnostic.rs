//! Pretty-printable reports for parse errors and evaluation warnings.
//!
//! [`DiagnosticReport`] renders a diagnostic against the query text with
//! labeled spans, for CLI consumers of the server. `Display` renders
//! without colours; [`DiagnosticReport::write`] keeps them.

use std::fmt;
use std::io;
use std::ops::Range;

use ariadne::ColorGenerator;
use ariadne::Config;
use ariadne::Label;
use ariadne::Report;
use ariadne::ReportKind;
use ariadne::Source;
use spelunk_path::ParseError;
use spelunk_path::Span;

use crate::EvalWarning;

/// A diagnostic report over a query string.
pub struct DiagnosticReport<'q> {
    query: &'q str,
    message: String,
    labels: Vec<(Span, String)>,
    help: Option<String>,
}

impl<'q> DiagnosticReport<'q> {
    pub fn builder(query: &'q str) -> Self {
        DiagnosticReport {
            query,
            message: String::new(),
            labels: Vec::new(),
            help: None,
        }
    }

    /// Report for a failed parse.
    pub fn for_parse_error(query: &'q str, error: &ParseError) -> Self {
        let mut report = Self::builder(query);
        report.with_message(error.message());
        report.with_label(error.span(), "the query fails here");
        report
    }

    /// Report for an evaluation warning.
    pub fn for_warning(query: &'q str, warning: &EvalWarning) -> Self {
        let mut report = Self::builder(query);
        report.with_message(warning.to_string());
        report.with_help("the predicate evaluated to false wherever it applied");
        report
    }

    /// Set the main message for the report.
    pub fn with_message(&mut self, message: impl ToString) {
        self.message = message.to_string();
    }

    /// Add a label at a span of the query.
    pub fn with_label(&mut self, span: Span, message: impl ToString) {
        self.labels.push((span, message.to_string()));
    }

    /// Set the help message, usually a suggestion on how to fix the error.
    pub fn with_help(&mut self, help: impl ToString) {
        self.help = Some(help.to_string());
    }

    fn build(&self, color: bool) -> Report<'static, Range<usize>> {
        let offset = self
            .labels
            .first()
            .map(|(span, _)| span.start)
            .unwrap_or(0);
        let mut colors = ColorGenerator::new();
        let mut report = Report::build(ReportKind::Error, (), offset)
            .with_config(Config::default().with_color(color))
            .with_message(&self.message);
        for (span, message) in &self.labels {
            let clamped = span.start.min(self.query.len())..span.end.min(self.query.len());
            report = report.with_label(
                Label::new(clamped)
                    .with_message(message)
                    .with_color(colors.next()),
            );
        }
        if let Some(help) = &self.help {
            report = report.with_help(help);
        }
        report.finish()
    }

    /// Write the report to a [`Write`](io::Write), with colours.
    pub fn write(&self, w: impl io::Write) -> io::Result<()> {
        self.build(true).write(Source::from(self.query), w)
    }
}

impl fmt::Display for DiagnosticReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Adaptor<'a, 'b> {
            f: &'a mut fmt::Formatter<'b>,
        }
        impl io::Write for Adaptor<'_, '_> {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                let s = std::str::from_utf8(buf).map_err(|_| io::ErrorKind::Other)?;
                self.f.write_str(s).map_err(|_| io::ErrorKind::Other)?;
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        self.build(false)
            .write(Source::from(self.query), Adaptor { f })
            .map_err(|_| fmt::Error)
    }
}
