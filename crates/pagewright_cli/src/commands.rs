//! Command implementations for the `pagewright` CLI.
//!
//! - `lookup_cmd`: resolve a page's URL, an account, an element or a setting
//! - `check_cmd`: load every document and report the ones that cannot be used

pub mod check_cmd;
pub mod lookup_cmd;

use clap::Subcommand;

use crate::errors::Error;
use crate::options::GlobalOptions;

/// `pagewright` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve the URL (or executable) of a page.
    Url {
        /// Page name, e.g. "Login Page".
        page: String,
    },

    /// Resolve an account of a page.
    Account {
        page: String,
        account: String,

        /// Show only this field.
        #[arg(long)]
        field: Option<String>,
    },

    /// Show how an element of a page is located.
    Element {
        page: String,
        element: String,

        /// Fail on element types that are not built in.
        #[arg(long)]
        strict: bool,
    },

    /// Show the value of a setting for the environment.
    Setting { key: String },

    /// Load every document and report invalid ones.
    Check {
        /// Fail on element types that are not built in.
        #[arg(long)]
        strict: bool,
    },
}

/// Run a command and print its output.
pub async fn execute(command: &Commands, options: &GlobalOptions) -> Result<(), Error> {
    let context = options.context()?;
    let output = match command {
        Commands::Url { page } => {
            lookup_cmd::format_location(&lookup_cmd::location_info(&context, page).await?, options.format)?
        }
        Commands::Account {
            page,
            account,
            field,
        } => {
            let info = lookup_cmd::account_info(&context, page, account, field.as_deref()).await?;
            lookup_cmd::format_account(&info, options.format)?
        }
        Commands::Element {
            page,
            element,
            strict,
        } => {
            let info = lookup_cmd::element_info(&context, page, element, *strict).await?;
            lookup_cmd::format_element(&info, options.format)?
        }
        Commands::Setting { key } => {
            lookup_cmd::format_setting(&lookup_cmd::setting_info(&context, key), options.format)?
        }
        Commands::Check { strict } => {
            let names = options.list_documents()?;
            let report = check_cmd::check_documents(&context, &names, *strict).await;
            println!("{}", check_cmd::format_report(&report, options.format)?);
            return report.into_result();
        }
    };
    println!("{}", output);
    Ok(())
}
