//! Output formatting for symdex
//!
//! Supports text (colored terminal) and JSON output formats.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::path::Path;
use symdex_core::{ReferenceKind, Route, ServiceEntry};

use crate::process::FileIndex;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// A reference with its position resolved to line and column
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceInfo {
    pub kind: ReferenceKind,
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub length: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_path: Option<String>,
}

/// Result of indexing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<ReferenceInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn indexed(path: &Path, file: &FileIndex) -> Self {
        let references = file
            .index
            .references
            .iter()
            .zip(file.positions.iter())
            .map(|(record, &(line, column))| ReferenceInfo {
                kind: record.kind,
                name: record.name.clone(),
                line,
                column,
                length: record.length,
                metadata: record.metadata.clone(),
                secondary_path: record.secondary_path.clone(),
            })
            .collect();

        Self {
            path: path.display().to_string(),
            references,
            routes: file.index.routes.iter().map(|(route, _)| route.clone()).collect(),
            services: file.index.services.clone(),
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            references: Vec::new(),
            routes: Vec::new(),
            services: Vec::new(),
            error: Some(error),
        }
    }

    pub fn record_count(&self) -> usize {
        self.references.len() + self.routes.len() + self.services.len()
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_records: usize,
    pub references: usize,
    pub routes: usize,
    pub services: usize,
    pub cached: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub project: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Report an indexed file; `cached` marks results read back from the cache
    pub fn report_file(&mut self, path: &Path, file: &FileIndex, cached: bool) {
        self.summary.files_processed += 1;
        if cached {
            self.summary.cached += 1;
        }

        let result = FileResult::indexed(path, file);
        if result.record_count() == 0 {
            if self.verbose && self.format == OutputFormat::Text {
                println!("{}: Nothing indexed", path.display());
            }
            self.results.push(result);
            return;
        }

        self.summary.files_with_records += 1;
        self.summary.references += result.references.len();
        self.summary.routes += result.routes.len();
        self.summary.services += result.services.len();

        if self.format == OutputFormat::Text {
            print_file(&result, cached);
        }

        self.results.push(result);
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, project: &Path) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Files with records: {}", self.summary.files_with_records);
                println!("  References: {}", self.summary.references);
                println!("  Routes: {}", self.summary.routes);
                println!("  Service aliases: {}", self.summary.services);
                if self.summary.cached > 0 {
                    println!("  From cache: {}", self.summary.cached);
                }
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    project: project.display().to_string(),
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
        }
        Ok(())
    }
}

fn print_file(result: &FileResult, cached: bool) {
    if cached {
        println!("{} {}", result.path.bold(), "(cached)".dimmed());
    } else {
        println!("{}", result.path.bold());
    }

    for reference in &result.references {
        let location = format!("{}:{}", reference.line, reference.column);
        let mut line = format!(
            "  {:>8}  {:<17} {}",
            location.dimmed(),
            reference.kind.as_str().cyan(),
            reference.name
        );
        if let Some(secondary) = &reference.secondary_path {
            line.push_str(&format!(" {}", format!("({})", secondary).dimmed()));
        }
        println!("{}", line);
    }

    for route in &result.routes {
        println!(
            "  {:>8}  {:<17} {} {} {}::{}",
            "",
            "route".green(),
            route.name,
            route.pattern.yellow(),
            route.controller,
            route.action
        );
    }

    for service in &result.services {
        println!(
            "  {:>8}  {:<17} {} {} {}",
            "",
            "service".magenta(),
            service.alias_id,
            "->".dimmed(),
            service.class_name
        );
    }

    println!();
}
