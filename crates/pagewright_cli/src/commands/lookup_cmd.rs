//! Single-value lookups.
//!
//! ```bash
//! pagewright url "Login Page" --env qa
//! pagewright account LoginPage RegularUser --field password
//! pagewright element LoginPage "Log In" --format json
//! pagewright setting browser
//! ```

use colored::Colorize;
use config_resolver::{DocumentName, PageObjectType, TestContext};
use pagewright_core::{ElementDescriptor, ElementError, ElementTypeRegistry};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::errors::Error;
use crate::options::OutputFormat;

#[cfg(test)]
#[path = "lookup_cmd_tests.rs"]
mod tests;

/// Where a page lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationInfo {
    pub page: String,
    /// `url` or `executable`.
    pub kind: String,
    pub location: String,
    /// Environment that was asked for.
    pub environment: String,
    /// Section that answered: the environment, `default` or `base`.
    pub section: String,
    /// Document that declared the value.
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub page: String,
    pub account: String,
    pub environment: String,
    pub section: String,
    pub source: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementInfo {
    pub page: String,
    pub element: String,
    pub source: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    /// Selectors in the order they are tried.
    pub selectors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingInfo {
    pub key: String,
    pub environment: String,
    pub value: Option<String>,
}

/// Resolve a page's URL, or its executable for desktop page objects.
#[instrument(skip(context))]
pub async fn location_info(context: &TestContext, page: &str) -> Result<LocationInfo, Error> {
    let name = DocumentName::from_phrase(page)?;
    let document = context.resolver().document(&name).await?;

    let (kind, resolved) = if document.page_object_type() == PageObjectType::Executable {
        ("executable", context.executable(&name).await?)
    } else {
        ("url", context.url(&name).await?)
    };
    debug!("{} {} resolved from {}", name, kind, resolved.document);

    Ok(LocationInfo {
        page: name.to_string(),
        kind: kind.to_string(),
        location: resolved.value,
        environment: context.environment(),
        section: resolved.environment,
        source: resolved.document.to_string(),
    })
}

/// Resolve a whole account, or one field of it.
#[instrument(skip(context))]
pub async fn account_info(
    context: &TestContext,
    page: &str,
    account: &str,
    field: Option<&str>,
) -> Result<AccountInfo, Error> {
    let name = DocumentName::from_phrase(page)?;
    let environment = context.environment();

    let (fields, section, source) = match field {
        Some(field) => {
            let resolved = context.account_field(&name, account, field).await?;
            let fields = BTreeMap::from([(field.to_string(), resolved.value)]);
            (fields, resolved.environment, resolved.document)
        }
        None => {
            let resolved = context
                .resolver()
                .resolve_account(&environment, account, &name)
                .await?;
            (resolved.fields, resolved.environment, resolved.document)
        }
    };

    Ok(AccountInfo {
        page: name.to_string(),
        account: account.to_string(),
        environment,
        section,
        source: source.to_string(),
        fields,
    })
}

/// Resolve an element definition into its kind and selectors.
#[instrument(skip(context))]
pub async fn element_info(
    context: &TestContext,
    page: &str,
    element: &str,
    strict: bool,
) -> Result<ElementInfo, Error> {
    let name = DocumentName::from_phrase(page)?;
    let resolved = context
        .resolver()
        .resolve_element(&name, element)
        .await?
        .ok_or_else(|| ElementError::NotFoundInConfiguration {
            element: element.to_string(),
            document: name.to_string(),
        })?;

    let types = if strict {
        ElementTypeRegistry::strict()
    } else {
        ElementTypeRegistry::new()
    };
    let descriptor = ElementDescriptor::from_resolved(&resolved, &types)?;

    Ok(ElementInfo {
        page: name.to_string(),
        element: descriptor.name,
        source: descriptor.document.to_string(),
        kind: descriptor.kind.to_string(),
        element_type: descriptor.element_type,
        selectors: descriptor.selectors.iter().map(ToString::to_string).collect(),
    })
}

pub fn setting_info(context: &TestContext, key: &str) -> SettingInfo {
    SettingInfo {
        key: key.to_string(),
        environment: context.environment(),
        value: context.store().get(key),
    }
}

pub fn format_location(info: &LocationInfo, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Pretty => Ok(format!(
            "{} {}\n{}: {}\n{}: {} ({} section of {})",
            info.page.bold().bright_cyan(),
            info.kind.dimmed(),
            info.kind.bold(),
            info.location.green(),
            "Environment".bold(),
            info.environment,
            info.section,
            info.source
        )),
    }
}

pub fn format_account(info: &AccountInfo, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Pretty => {
            let mut output = format!(
                "{} {}\n{}: {} ({} section of {})\n",
                info.account.bold().bright_cyan(),
                info.page.dimmed(),
                "Environment".bold(),
                info.environment,
                info.section,
                info.source
            );
            for (field, value) in &info.fields {
                output.push_str(&format!("  {}: {}\n", field.bold(), value));
            }
            Ok(output.trim_end().to_string())
        }
    }
}

pub fn format_element(info: &ElementInfo, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Pretty => {
            let mut output = format!(
                "{} {}\n{}: {}",
                info.element.bold().bright_cyan(),
                info.source.dimmed(),
                "Kind".bold(),
                info.kind.green()
            );
            if let Some(element_type) = &info.element_type {
                output.push_str(&format!(" (elementType: {})", element_type));
            }
            output.push_str(&format!("\n{}:", "Selectors".bold()));
            for selector in &info.selectors {
                output.push_str(&format!("\n  {}", selector));
            }
            Ok(output)
        }
    }
}

pub fn format_setting(info: &SettingInfo, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        OutputFormat::Pretty => Ok(match &info.value {
            Some(value) => format!("{} = {}", info.key.bold(), value),
            None => format!("{} {}", info.key.bold(), "(not set)".dimmed()),
        }),
    }
}
