//! Pagewright core: pages, element handles and bounded waits.
//!
//! This crate sits between test steps and a browser:
//!
//! - [`PageManager`] / [`Page`]: the current page object, its URL and
//!   navigation
//! - [`ElementRegistry`] / [`Element`]: element handles resolved from page
//!   documents through [`config_resolver`], cached per page
//! - [`Textbox`], [`Checkbox`], [`Radiobutton`], [`SelectList`], [`Table`]:
//!   capability views chosen by an element's `elementType`
//! - [`Waiter`]: the polling engine every wait goes through
//! - [`Browser`]: the capability a browser driver implements
//!
//! # Examples
//!
//! ```no_run
//! use config_resolver::TestContext;
//! use pagewright_core::{Browser, HarnessResult, PageManager};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example(browser: Arc<dyn Browser>) -> HarnessResult<()> {
//! let context = TestContext::from_filesystem(Path::new("conf/sentinel.yml"), ["conf/pages"])?;
//! let pages = PageManager::new(Arc::new(context), browser);
//!
//! pages.open("Login Page", None).await?;
//! let username = pages.element("Username").await?;
//! username.as_textbox()?.replace_text("test").await?;
//! pages.element("Log In").await?.click().await?;
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod descriptor;
pub mod element;
pub mod element_types;
pub mod errors;
pub mod page;
pub mod page_manager;
pub mod registry;
pub mod synchronization;
pub mod views;

pub use browser::{
    Browser, BrowserError, BrowserResult, NodeHandle, Selector, SelectorKind, UnknownSelectorKind,
};
pub use descriptor::ElementDescriptor;
pub use element::Element;
pub use element_types::{ElementKind, ElementTypeRegistry};
pub use errors::{ElementError, HarnessError, HarnessResult, PageError};
pub use page::Page;
pub use page_manager::PageManager;
pub use registry::ElementRegistry;
pub use synchronization::{Probe, Transience, WaitError, WaitOptions, Waiter};
pub use views::{
    natural_cmp, Checkbox, OptionChoice, Radiobutton, SelectList, Table, TableData, Textbox,
};
pub use tokio_util::sync::CancellationToken;
