//! Validation of a whole configuration tree.
//!
//! Every document below the search roots is loaded together with its
//! includes, and every element it declares is turned into a descriptor.
//! Anything that would fail at test time is reported here.

use colored::Colorize;
use config_resolver::{ConfigDocument, DocumentName, ResolvedElement, TestContext};
use pagewright_core::{ElementDescriptor, ElementTypeRegistry};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::errors::Error;
use crate::options::OutputFormat;

#[cfg(test)]
#[path = "check_cmd_tests.rs"]
mod tests;

/// Outcome for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentCheck {
    pub document: String,
    /// `WebPage`, `Executable` or `Unknown`; absent if the document did not
    /// load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_object_type: Option<String>,
    /// Documents reached through `include`, in search order.
    pub includes: Vec<String>,
    pub elements: usize,
    pub issues: Vec<String>,
}

impl DocumentCheck {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub environment: String,
    pub documents: Vec<DocumentCheck>,
}

impl CheckReport {
    pub fn failed(&self) -> usize {
        self.documents.iter().filter(|d| !d.is_valid()).count()
    }

    /// `Error::CheckFailed` if any document has issues.
    pub fn into_result(self) -> Result<(), Error> {
        match self.failed() {
            0 => Ok(()),
            failed => Err(Error::CheckFailed {
                failed,
                checked: self.documents.len(),
            }),
        }
    }
}

/// Check each named document.
#[instrument(skip(context, names), fields(documents = names.len()))]
pub async fn check_documents(
    context: &TestContext,
    names: &[DocumentName],
    strict: bool,
) -> CheckReport {
    let types = if strict {
        ElementTypeRegistry::strict()
    } else {
        ElementTypeRegistry::new()
    };

    let mut documents = Vec::with_capacity(names.len());
    for name in names {
        documents.push(check_document(context, name, &types).await);
    }

    let report = CheckReport {
        environment: context.environment(),
        documents,
    };
    info!(
        "Checked {} documents, {} failed",
        report.documents.len(),
        report.failed()
    );
    report
}

async fn check_document(
    context: &TestContext,
    name: &DocumentName,
    types: &ElementTypeRegistry,
) -> DocumentCheck {
    let mut check = DocumentCheck {
        document: name.to_string(),
        page_object_type: None,
        includes: Vec::new(),
        elements: 0,
        issues: Vec::new(),
    };

    let document = match context.resolver().document(name).await {
        Ok(document) => document,
        Err(e) => {
            warn!("{} failed to load: {}", name, e);
            check.issues.push(e.to_string());
            return check;
        }
    };
    check.page_object_type = Some(format!("{:?}", document.page_object_type()));

    match context.resolver().include_closure(name).await {
        Ok(closure) => {
            check.includes = closure
                .iter()
                .filter(|part| *part != name)
                .map(ToString::to_string)
                .collect();
        }
        Err(e) => {
            warn!("Includes of {} failed: {}", name, e);
            check.issues.push(e.to_string());
        }
    }

    check_elements(&document, types, &mut check);
    debug!("{} has {} issue(s)", name, check.issues.len());
    check
}

fn check_elements(document: &ConfigDocument, types: &ElementTypeRegistry, check: &mut DocumentCheck) {
    for element in document.element_names() {
        let Some(attributes) = document.element(element) else {
            continue;
        };
        check.elements += 1;
        let resolved = ResolvedElement {
            name: element.to_string(),
            attributes: attributes.clone(),
            document: document.name().clone(),
        };
        if let Err(e) = ElementDescriptor::from_resolved(&resolved, types) {
            check.issues.push(e.to_string());
        }
    }
}

pub fn format_report(report: &CheckReport, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Pretty => Ok(format_report_pretty(report)),
    }
}

fn format_report_pretty(report: &CheckReport) -> String {
    let mut output = format!(
        "{} {}\n\n",
        "Checking documents for".bold(),
        report.environment.bright_cyan()
    );

    for document in &report.documents {
        let marker = if document.is_valid() {
            "✓".green()
        } else {
            "✗".red()
        };
        output.push_str(&format!(
            "{} {} {}\n",
            marker,
            document.document.bold(),
            document
                .page_object_type
                .as_deref()
                .unwrap_or("not loaded")
                .dimmed()
        ));
        if !document.includes.is_empty() {
            output.push_str(&format!("    includes: {}\n", document.includes.join(", ")));
        }
        for issue in &document.issues {
            output.push_str(&format!("    {}\n", issue.red()));
        }
    }

    let failed = report.failed();
    let summary = format!(
        "{} documents checked, {} failed",
        report.documents.len(),
        failed
    );
    if failed == 0 {
        output.push_str(&format!("\n{}", summary.green().bold()));
    } else {
        output.push_str(&format!("\n{}", summary.red().bold()));
    }
    output
}
