use std::io::Write;

use tracing::{debug, warn};

use crate::sentiment::SentimentAnalysis;

/// The six named result fields, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFields {
    pub snippet: String,
    pub polarity: String,
    pub agreement: String,
    pub subjectivity: String,
    pub confidence: String,
    pub irony: String,
}

impl From<&SentimentAnalysis> for ResultFields {
    fn from(analysis: &SentimentAnalysis) -> Self {
        ResultFields {
            snippet: analysis.snippet.clone(),
            polarity: analysis.polarity.clone(),
            agreement: analysis.agreement.clone(),
            subjectivity: analysis.subjectivity.clone(),
            confidence: format!("{}%", analysis.confidence),
            irony: analysis.irony.clone(),
        }
    }
}

/// Whatever shows the form: supplies the URL, shows alerts, toggles the
/// submit control and renders results.
pub trait ResultView: Send + Sync {
    fn target_url(&self) -> String;
    fn alert(&self, message: &str);
    fn set_submit_enabled(&self, enabled: bool);
    fn render(&self, fields: &ResultFields);
}

/// Renders to the terminal: results on stdout, alerts on stderr.
pub struct TerminalView {
    target_url: String,
}

impl TerminalView {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self { target_url: target_url.into() }
    }
}

impl ResultView for TerminalView {
    fn target_url(&self) -> String {
        self.target_url.clone()
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        debug!(enabled, "submit control toggled");
    }

    fn render(&self, fields: &ResultFields) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        if let Err(e) = write_fields(&mut out, fields) {
            warn!(error = %e, "failed to write results to stdout");
        }
    }
}

pub fn write_fields<W: Write>(out: &mut W, fields: &ResultFields) -> std::io::Result<()> {
    writeln!(out, "Page snippet:")?;
    writeln!(out, "  {}", fields.snippet)?;
    writeln!(out)?;
    writeln!(out, "Page features:")?;
    for (label, value) in [
        ("Polarity", &fields.polarity),
        ("Agreement", &fields.agreement),
        ("Subjectivity", &fields.subjectivity),
        ("Confidence", &fields.confidence),
        ("Irony", &fields.irony),
    ] {
        writeln!(out, "  {:<14}{}", label, value)?;
    }
    Ok(())
}
