//! Interactive fallbacks for options left off the command line.

use anyhow::{bail, Context, Result};
use benchdb_core::catalog::CatalogEntry;
use chrono::NaiveDate;
use dialoguer::{Input, Select};

pub fn text(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    let value: String = Input::new().with_prompt(prompt).interact_text()?;
    Ok(value)
}

/// Like [`text`], but an empty answer means "not set".
pub fn optional_text(value: Option<String>, prompt: &str) -> Result<Option<String>> {
    if value.is_some() {
        return Ok(value);
    }
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let trimmed = value.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

pub fn date(value: Option<NaiveDate>, prompt: &str, default: NaiveDate) -> Result<NaiveDate> {
    if let Some(value) = value {
        return Ok(value);
    }
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()?;
    raw.trim()
        .parse::<NaiveDate>()
        .with_context(|| format!("'{raw}' is not a YYYY-MM-DD date"))
}

/// Lets the user pick one of `entries` and returns its id.
pub fn select<T: CatalogEntry>(what: &str, entries: &[T]) -> Result<i32> {
    if entries.is_empty() {
        bail!("no {what} recorded yet; add one first");
    }
    let labels: Vec<String> = entries.iter().map(ToString::to_string).collect();
    let index = Select::new()
        .with_prompt(format!("Select {what} by ID"))
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(entries[index].id())
}
