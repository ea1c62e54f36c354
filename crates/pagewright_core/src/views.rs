//! Capability views over typed elements.
//!
//! A view borrows an [`Element`] whose kind supports it and adds the
//! operations of that kind. Views are obtained through
//! [`Element::as_textbox`], [`Element::as_selectable`] and friends, which
//! fail with `ElementError::TypeMismatch` for any other kind.

use crate::browser::{BrowserResult, NodeHandle, Selector, SelectorKind};
use crate::element::Element;
use crate::errors::ElementError;
use crate::synchronization::{Probe, WaitError, Waiter};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, info};

#[cfg(test)]
#[path = "views_tests.rs"]
mod tests;

const VALUE_ATTRIBUTE: &str = "value";
const MISSING_OPTION: &str = "missing option";

/// Text input. Its text is the `value` attribute, not the node text.
#[derive(Debug, Clone, Copy)]
pub struct Textbox<'a> {
    element: &'a Element,
}

impl<'a> Textbox<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Current contents of the input.
    pub async fn value(&self) -> Result<String, ElementError> {
        Ok(self
            .element
            .attribute(VALUE_ATTRIBUTE)
            .await?
            .unwrap_or_default())
    }

    /// Append text to the current contents.
    pub async fn type_text(&self, text: &str) -> Result<(), ElementError> {
        self.element.send_keys(text).await
    }

    /// Clear the input, then type `text`.
    pub async fn replace_text(&self, text: &str) -> Result<(), ElementError> {
        self.element.clear().await?;
        self.element.send_keys(text).await
    }

    pub async fn clear(&self) -> Result<(), ElementError> {
        self.element.clear().await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Checkbox<'a> {
    element: &'a Element,
}

impl<'a> Checkbox<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub async fn is_checked(&self) -> Result<bool, ElementError> {
        self.element.is_selected().await
    }

    /// Check the box; does nothing if it is already checked.
    pub async fn check(&self) -> Result<(), ElementError> {
        self.set_checked(true).await
    }

    /// Uncheck the box; does nothing if it is already unchecked.
    pub async fn uncheck(&self) -> Result<(), ElementError> {
        self.set_checked(false).await
    }

    async fn set_checked(&self, checked: bool) -> Result<(), ElementError> {
        if self.element.is_selected().await? == checked {
            debug!("{} already in the requested state", self.element.name());
            return Ok(());
        }
        self.element.click().await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Radiobutton<'a> {
    element: &'a Element,
}

impl<'a> Radiobutton<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    pub async fn is_selected(&self) -> Result<bool, ElementError> {
        self.element.is_selected().await
    }

    /// Select the button; does nothing if it is already selected.
    pub async fn select(&self) -> Result<(), ElementError> {
        if self.element.is_selected().await? {
            return Ok(());
        }
        self.element.click().await
    }
}

/// How an option of a select list is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChoice<'a> {
    /// Visible text, compared after trimming.
    Text(&'a str),
    /// The option's `value` attribute.
    Value(&'a str),
    /// 0-based position in the list.
    Index(usize),
}

impl fmt::Display for OptionChoice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Value(value) => write!(f, "value={}", value),
            Self::Index(index) => write!(f, "index={}", index),
        }
    }
}

/// Select list (drop-down). Options are the `option` nodes inside it.
#[derive(Debug, Clone, Copy)]
pub struct SelectList<'a> {
    element: &'a Element,
}

impl<'a> SelectList<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Visible text of every option, trimmed, in list order.
    pub async fn options(&self) -> Result<Vec<String>, ElementError> {
        let view = *self;
        self.element
            .wait(&self.element.describe("options"), move || async move {
                view.element
                    .with_node(|node| view.option_texts(node))
                    .await
            })
            .await
    }

    pub async fn has_option(&self, text: &str) -> Result<bool, ElementError> {
        let wanted = text.trim();
        Ok(self.options().await?.iter().any(|option| option == wanted))
    }

    pub async fn option_count(&self) -> Result<usize, ElementError> {
        Ok(self.options().await?.len())
    }

    /// Text of the first selected option, `None` if nothing is selected.
    pub async fn selected_text(&self) -> Result<Option<String>, ElementError> {
        let view = *self;
        self.element
            .wait(&self.element.describe("selection"), move || async move {
                view.element
                    .with_node(|node| view.first_selected(node))
                    .await
            })
            .await
    }

    pub async fn select_by_text(&self, text: &str) -> Result<(), ElementError> {
        self.select(OptionChoice::Text(text)).await
    }

    pub async fn select_by_value(&self, value: &str) -> Result<(), ElementError> {
        self.select(OptionChoice::Value(value)).await
    }

    pub async fn select_by_index(&self, index: usize) -> Result<(), ElementError> {
        self.select(OptionChoice::Index(index)).await
    }

    /// Click the chosen option, waiting for it to appear.
    ///
    /// # Errors
    ///
    /// `ElementError::NoSuchOption` if the list never contains the option
    /// within the default timeout.
    pub async fn select(&self, choice: OptionChoice<'_>) -> Result<(), ElementError> {
        let view = *self;
        let result = Waiter::new(self.element.wait_options())
            .until(
                &self.element.describe(&format!("option '{}'", choice)),
                move || async move {
                    view.element
                        .with_node(|node| view.pick(node, choice))
                        .await
                },
            )
            .await;

        match result {
            Ok(()) => {
                info!("Selected '{}' in {}", choice, self.element.name());
                Ok(())
            }
            Err(WaitError::TimedOut {
                last_observation: Some(observation),
                ..
            }) if observation == MISSING_OPTION => Err(ElementError::NoSuchOption {
                element: self.element.name().to_string(),
                option: choice.to_string(),
            }),
            Err(e) => Err(self.element.wait_failure(e)),
        }
    }

    async fn option_nodes(&self, list: &NodeHandle) -> BrowserResult<Vec<NodeHandle>> {
        self.element
            .browser()
            .find_nodes_within(list, &Selector::new(SelectorKind::TagName, "option"))
            .await
    }

    async fn option_texts(&self, list: NodeHandle) -> BrowserResult<Probe<Vec<String>>> {
        let mut texts = Vec::new();
        for option in self.option_nodes(&list).await? {
            texts.push(self.element.browser().text(&option).await?.trim().to_string());
        }
        Ok(Probe::Ready(texts))
    }

    async fn first_selected(&self, list: NodeHandle) -> BrowserResult<Probe<Option<String>>> {
        let browser = self.element.browser();
        for option in self.option_nodes(&list).await? {
            if browser.is_selected(&option).await? {
                let text = browser.text(&option).await?;
                return Ok(Probe::Ready(Some(text.trim().to_string())));
            }
        }
        Ok(Probe::Ready(None))
    }

    async fn pick(&self, list: NodeHandle, choice: OptionChoice<'_>) -> BrowserResult<Probe<()>> {
        let browser = self.element.browser();
        for (index, option) in self.option_nodes(&list).await?.into_iter().enumerate() {
            let matches = match choice {
                OptionChoice::Text(text) => browser.text(&option).await?.trim() == text.trim(),
                OptionChoice::Value(value) => {
                    browser.attribute(&option, VALUE_ATTRIBUTE).await?.as_deref() == Some(value)
                }
                OptionChoice::Index(wanted) => index == wanted,
            };
            if matches {
                browser.click(&option).await?;
                return Ok(Probe::Ready(()));
            }
        }
        Ok(Probe::observed(MISSING_OPTION))
    }
}

/// Contents of a table read in one pass.
///
/// Headers come from `th` cells. A table without `th` cells uses its first
/// row as the header row. Data rows are the `tr` rows with `td` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build from header cell texts and the cell texts of every `tr`.
    pub fn from_cells(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut rows: Vec<Vec<String>> = rows.into_iter().filter(|row| !row.is_empty()).collect();
        if headers.is_empty() && !rows.is_empty() {
            let headers = rows.remove(0);
            return Self { headers, rows };
        }
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column: an exact header match, otherwise the first header
    /// containing `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.headers
            .iter()
            .position(|header| header.trim() == name)
            .or_else(|| self.headers.iter().position(|header| header.contains(name)))
    }

    /// Cells of a column, top to bottom. Short rows contribute empty cells.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map(String::as_str).unwrap_or_default())
                .collect(),
        )
    }

    /// Cell in a 1-based data row.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        let row = self.rows.get(row.checked_sub(1)?)?;
        Some(row.get(index).map(String::as_str).unwrap_or_default())
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.rows
            .iter()
            .flatten()
            .any(|cell| cell.contains(text))
    }

    pub fn all_cells_contain(&self, column: &str, text: &str) -> Option<bool> {
        Some(self.column(column)?.iter().all(|cell| cell.contains(text)))
    }

    pub fn any_cell_contains(&self, column: &str, text: &str) -> Option<bool> {
        Some(self.column(column)?.iter().any(|cell| cell.contains(text)))
    }

    /// Whether a column is sorted, comparing embedded numbers by value.
    pub fn column_is_sorted(&self, column: &str, ascending: bool) -> Option<bool> {
        let cells = self.column(column)?;
        Some(cells.windows(2).all(|pair| {
            let order = natural_cmp(pair[0], pair[1]);
            if ascending {
                order != Ordering::Greater
            } else {
                order != Ordering::Less
            }
        }))
    }

    pub fn column_is_unique(&self, column: &str) -> Option<bool> {
        let mut cells = self.column(column)?;
        let total = cells.len();
        cells.sort_unstable();
        cells.dedup();
        Some(cells.len() == total)
    }
}

/// Order strings so that digit runs compare by numeric value: `"Item 2"`
/// sorts before `"Item 10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let order = match (is_number(l), is_number(r)) {
                    (true, true) => compare_numbers(l, r),
                    _ => l.cmp(r),
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
        }
    }
}

fn is_number(chunk: &str) -> bool {
    chunk.starts_with(|c: char| c.is_ascii_digit())
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Splits a string into alternating runs of ASCII digits and non-digits.
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());
        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

/// Table element. Every query reads the table afresh.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    element: &'a Element,
}

impl<'a> Table<'a> {
    pub(crate) fn new(element: &'a Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Read headers and every row.
    pub async fn read(&self) -> Result<TableData, ElementError> {
        let view = *self;
        let data = self
            .element
            .wait(&self.element.describe("contents"), move || async move {
                view.element
                    .with_node(|node| view.read_cells(node))
                    .await
            })
            .await?;
        debug!(
            "Read {} rows and {} headers from {}",
            data.row_count(),
            data.headers().len(),
            self.element.name()
        );
        Ok(data)
    }

    pub async fn headers(&self) -> Result<Vec<String>, ElementError> {
        Ok(self.read().await?.headers)
    }

    pub async fn row_count(&self) -> Result<usize, ElementError> {
        Ok(self.read().await?.row_count())
    }

    pub async fn has_column(&self, column: &str) -> Result<bool, ElementError> {
        Ok(self.read().await?.column_index(column).is_some())
    }

    /// Cells of a column.
    ///
    /// # Errors
    ///
    /// `ElementError::NoSuchColumn` if no header matches.
    pub async fn column(&self, column: &str) -> Result<Vec<String>, ElementError> {
        let data = self.read().await?;
        let cells = data.column(column).ok_or_else(|| self.no_such_column(column))?;
        Ok(cells.into_iter().map(str::to_string).collect())
    }

    /// Cell in a 1-based data row.
    pub async fn cell(&self, row: usize, column: &str) -> Result<String, ElementError> {
        let data = self.read().await?;
        if data.column_index(column).is_none() {
            return Err(self.no_such_column(column));
        }
        data.cell(row, column)
            .map(str::to_string)
            .ok_or_else(|| ElementError::NoSuchRow {
                element: self.element.name().to_string(),
                row,
            })
    }

    pub async fn contains_text(&self, text: &str) -> Result<bool, ElementError> {
        Ok(self.read().await?.contains_text(text))
    }

    pub async fn all_cells_contain(&self, column: &str, text: &str) -> Result<bool, ElementError> {
        self.read()
            .await?
            .all_cells_contain(column, text)
            .ok_or_else(|| self.no_such_column(column))
    }

    pub async fn any_cell_contains(&self, column: &str, text: &str) -> Result<bool, ElementError> {
        self.read()
            .await?
            .any_cell_contains(column, text)
            .ok_or_else(|| self.no_such_column(column))
    }

    pub async fn column_is_sorted(&self, column: &str, ascending: bool) -> Result<bool, ElementError> {
        self.read()
            .await?
            .column_is_sorted(column, ascending)
            .ok_or_else(|| self.no_such_column(column))
    }

    pub async fn column_is_unique(&self, column: &str) -> Result<bool, ElementError> {
        self.read()
            .await?
            .column_is_unique(column)
            .ok_or_else(|| self.no_such_column(column))
    }

    fn no_such_column(&self, column: &str) -> ElementError {
        ElementError::NoSuchColumn {
            element: self.element.name().to_string(),
            column: column.to_string(),
        }
    }

    async fn cell_texts(&self, parent: &NodeHandle, tag: &str) -> BrowserResult<Vec<String>> {
        let browser = self.element.browser();
        let mut texts = Vec::new();
        for cell in browser
            .find_nodes_within(parent, &Selector::new(SelectorKind::TagName, tag))
            .await?
        {
            texts.push(browser.text(&cell).await?.trim().to_string());
        }
        Ok(texts)
    }

    async fn read_cells(&self, table: NodeHandle) -> BrowserResult<Probe<TableData>> {
        let headers = self.cell_texts(&table, "th").await?;
        let mut rows = Vec::new();
        for row in self
            .element
            .browser()
            .find_nodes_within(&table, &Selector::new(SelectorKind::TagName, "tr"))
            .await?
        {
            rows.push(self.cell_texts(&row, "td").await?);
        }
        Ok(Probe::Ready(TableData::from_cells(headers, rows)))
    }
}
