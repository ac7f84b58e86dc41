//! Output formatting for CLI commands
//!
//! Text mode prints one human-readable line per event. JSON mode prints one
//! object per line, so a pipeline run can be consumed as a stream.

use serde::Serialize;
use serde_json::Value;

use crate::pipeline::StageOutcome;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes command results to stdout and diagnostics to stderr
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Prints a confirmation line
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "success": true, "message": message }))
            }
        }
    }

    /// Prints the confirmation for a completed pipeline stage
    pub fn stage(&self, outcome: &StageOutcome) {
        if let Some(path) = &outcome.output {
            self.verbose_ctx(outcome.stage.as_str(), &format!("Wrote {}", path.display()));
        }

        match self.format {
            OutputFormat::Text => println!("{}", outcome.message()),
            OutputFormat::Json => println!("{}", stage_record(outcome)),
        }
    }

    /// Prints a failure that does not abort the command
    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", message),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "success": false, "error": message }))
            }
        }
    }

    /// Prints structured data, pretty in text mode
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = match self.format {
            OutputFormat::Text => serde_json::to_string_pretty(data),
            OutputFormat::Json => serde_json::to_string(data),
        };
        if let Ok(json) = rendered {
            println!("{}", json);
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Prints a debug line on stderr when `--verbose` is set
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Same as [`Output::verbose`], tagged with what produced the line
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}

/// The JSON line printed for a completed stage
pub fn stage_record(outcome: &StageOutcome) -> Value {
    serde_json::json!({
        "success": true,
        "stage": outcome.stage,
        "implicit": outcome.implicit,
        "output": outcome.output,
        "message": outcome.message(),
    })
}
