//! TOML item bank parser.
//!
//! Loads item banks from TOML files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constructs::{build_cascade, CascadeOptions, MarkingPolicy};
use crate::model::{Construct, Item, ItemBank, ScaleDescriptor};

/// Intermediate TOML structure for parsing item bank files.
#[derive(Debug, Deserialize)]
struct TomlItemFile {
    item_bank: TomlItemBankHeader,
    #[serde(default)]
    items: Vec<TomlItem>,
}

#[derive(Debug, Deserialize)]
struct TomlItemBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_scale_str")]
    default_scale: String,
}

fn default_scale_str() -> String {
    "graded".to_string()
}

#[derive(Debug, Deserialize)]
struct TomlItem {
    id: String,
    #[serde(default)]
    name: String,
    construct: String,
    target: String,
    lemma: String,
    form: String,
    #[serde(default)]
    secondary_form: Option<String>,
    #[serde(default)]
    scale: Option<String>,
    #[serde(default)]
    lookahead: Option<usize>,
    #[serde(default)]
    marking: Option<String>,
}

/// Parse a single TOML file into an `ItemBank`.
pub fn parse_item_bank(path: &Path) -> Result<ItemBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read item bank file: {}", path.display()))?;

    parse_item_bank_str(&content, path)
}

/// Parse a TOML string into an `ItemBank` (useful for testing).
pub fn parse_item_bank_str(content: &str, source_path: &Path) -> Result<ItemBank> {
    let parsed: TomlItemFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let default_scale: ScaleDescriptor = parsed
        .item_bank
        .default_scale
        .parse()
        .with_context(|| format!("invalid default_scale in {}", source_path.display()))?;

    let items = parsed
        .items
        .into_iter()
        .map(|i| {
            let construct: Construct = i
                .construct
                .parse()
                .with_context(|| format!("item '{}'", i.id))?;
            let scale = i
                .scale
                .map(|s| s.parse::<ScaleDescriptor>())
                .transpose()
                .with_context(|| format!("item '{}'", i.id))?
                .unwrap_or(default_scale);

            let mut options = CascadeOptions::default();
            if let Some(lookahead) = i.lookahead {
                options.lookahead = lookahead;
            }
            if let Some(marking) = i.marking {
                options.marking = marking
                    .parse::<MarkingPolicy>()
                    .with_context(|| format!("item '{}'", i.id))?;
            }

            Ok(Item {
                id: i.id,
                name: i.name,
                construct,
                target: i.target,
                lemma: i.lemma,
                form: i.form,
                secondary_form: i.secondary_form,
                scale,
                options,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ItemBank {
        id: parsed.item_bank.id,
        name: parsed.item_bank.name,
        description: parsed.item_bank.description,
        default_scale,
        items,
    })
}

/// Recursively load all `.toml` item bank files from a directory.
pub fn load_item_directory(dir: &Path) -> Result<Vec<ItemBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_item_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_item_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a single file or every bank under a directory.
pub fn load_item_banks(path: &Path) -> Result<Vec<ItemBank>> {
    if path.is_dir() {
        load_item_directory(path)
    } else {
        Ok(vec![parse_item_bank(path)?])
    }
}

/// Find an item by id across banks.
pub fn find_item<'a>(banks: &'a [ItemBank], id: &str) -> Result<&'a Item> {
    banks
        .iter()
        .find_map(|b| b.item(id))
        .with_context(|| {
            let known: Vec<&str> = banks
                .iter()
                .flat_map(|b| b.items.iter().map(|i| i.id.as_str()))
                .collect();
            format!("item '{id}' not found. Available: {known:?}")
        })
}

/// A validation warning.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The item ID (if applicable).
    pub item_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate an item bank for common issues.
pub fn validate_item_bank(bank: &ItemBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for item in &bank.items {
        if !seen_ids.insert(&item.id) {
            warnings.push(ValidationWarning {
                item_id: Some(item.id.clone()),
                message: format!("duplicate item ID: {}", item.id),
            });
        }
    }

    for item in &bank.items {
        let warn = |message: String| ValidationWarning {
            item_id: Some(item.id.clone()),
            message,
        };

        let target = match item.target_spec() {
            Ok(target) => target,
            Err(e) => {
                warnings.push(warn(format!("invalid target: {e}")));
                continue;
            }
        };

        if let Err(e) = build_cascade(item.construct, item.scale, &item.options) {
            warnings.push(warn(format!("cannot build cascade: {e}")));
        }

        let has_form = target
            .target_sentence()
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .any(|word| target.matches_form(word));
        if !has_form {
            warnings.push(warn(format!(
                "target sentence does not contain form '{}'",
                target.target_form()
            )));
        }

        if item.construct == Construct::BePassive && item.options.marking != MarkingPolicy::default()
        {
            warnings.push(warn(
                "marking only applies to third-person-singular items and will be ignored".into(),
            ));
        }
    }

    warnings
}
