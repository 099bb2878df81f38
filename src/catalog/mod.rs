//! Template catalog.
//!
//! Holds every known template, answers keyword lookups and keeps the
//! runtime disabled list.

mod template;

pub use template::Template;

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{CatalogError, count_range};
use crate::options::short_flags;

/// On-disk catalog layout.
#[derive(Deserialize)]
struct CatalogFile {
    memes: Vec<Template>,
}

/// All templates plus the disabled list.
#[derive(Debug)]
pub struct Catalog {
    templates: Vec<Template>,
    /// Every keyword of every template, in catalog order.
    keywords: Vec<String>,
    disabled: RwLock<Vec<String>>,
}

impl Catalog {
    pub fn new(templates: Vec<Template>) -> Self {
        let keywords = templates
            .iter()
            .flat_map(|t| t.keywords.iter().cloned())
            .collect();

        Self {
            templates,
            keywords,
            disabled: RwLock::new(Vec::new()),
        }
    }

    /// Parse a catalog from JSON text.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let file: CatalogFile = serde_json::from_str(json).context("invalid catalog JSON")?;
        Ok(Self::new(file.memes))
    }

    /// Load the catalog file at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        let catalog = Self::from_json(&json)?;
        info!(
            "Loaded {} memes ({} keywords) from {}",
            catalog.templates.len(),
            catalog.keywords.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Seed the disabled list, skipping keywords the catalog doesn't know.
    #[must_use]
    pub fn with_disabled(self, disabled: &[String]) -> Self {
        {
            let mut list = self.disabled.write();
            for keyword in disabled {
                if self.is_known(keyword) {
                    if !list.contains(keyword) {
                        list.push(keyword.clone());
                    }
                } else {
                    warn!("Ignoring unknown disabled meme: {}", keyword);
                }
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn is_known(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    /// First template answering to `keyword`.
    pub fn find(&self, keyword: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.answers_to(keyword))
    }

    /// Find the keyword a message is asking for.
    ///
    /// Fuzzy matching looks for any keyword inside the whole message;
    /// otherwise only the first word is searched.
    pub fn match_keyword(&self, message: &str, fuzzy: bool) -> Option<&str> {
        let haystack = if fuzzy {
            message
        } else {
            message.split_whitespace().next()?
        };

        self.keywords
            .iter()
            .find(|k| haystack.contains(k.as_str()))
            .map(String::as_str)
    }

    pub fn is_disabled(&self, keyword: &str) -> bool {
        self.disabled.read().iter().any(|k| k == keyword)
    }

    pub fn disable(&self, keyword: &str) -> Result<(), CatalogError> {
        if !self.is_known(keyword) {
            return Err(CatalogError::UnknownKeyword(keyword.to_string()));
        }
        let mut list = self.disabled.write();
        if list.iter().any(|k| k == keyword) {
            return Err(CatalogError::AlreadyDisabled(keyword.to_string()));
        }
        list.push(keyword.to_string());
        info!("Disabled memes: {:?}", *list);
        Ok(())
    }

    pub fn enable(&self, keyword: &str) -> Result<(), CatalogError> {
        if !self.is_known(keyword) {
            return Err(CatalogError::UnknownKeyword(keyword.to_string()));
        }
        let mut list = self.disabled.write();
        let Some(pos) = list.iter().position(|k| k == keyword) else {
            return Err(CatalogError::NotDisabled(keyword.to_string()));
        };
        list.remove(pos);
        info!("Disabled memes: {:?}", *list);
        Ok(())
    }

    pub fn disabled(&self) -> Vec<String> {
        self.disabled.read().clone()
    }

    /// Human-readable description of a template's inputs.
    pub fn details(&self, keyword: &str) -> Option<String> {
        if !self.is_known(keyword) {
            return None;
        }
        let template = self.find(keyword)?;
        let params = &template.params;
        let mut out = String::new();

        let _ = writeln!(out, "Name: {}", template.key);
        if !template.keywords.is_empty() {
            let _ = writeln!(out, "Keywords: {}", template.keywords.join(", "));
        }
        if params.max_images > 0 {
            let _ = writeln!(out, "Images: {}", count_range(params.min_images, params.max_images));
        }
        if params.max_texts > 0 {
            let _ = writeln!(out, "Texts: {}", count_range(params.min_texts, params.max_texts));
        }
        if !params.default_texts.is_empty() {
            let _ = writeln!(out, "Default texts: {}", params.default_texts.join(", "));
        }
        if !template.tags.is_empty() {
            let _ = writeln!(out, "Tags: {}", template.tags.join(", "));
        }
        if !params.options.is_empty() {
            let _ = writeln!(out, "Options:");
            let shorts = short_flags(&params.options);
            for (option, short) in params.options.iter().zip(shorts) {
                let mut spellings = vec![format!("--{}", option.hyphenated())];
                spellings.extend(short.map(|s| format!("-{}", s)));
                spellings.extend(option.aliases.iter().map(|a| format!("--{}", a)));
                let _ = write!(out, "  {} <{}>", spellings.join("/"), option.effective_kind());
                if let Some(default) = &option.default {
                    let _ = write!(out, " (default: {})", default);
                }
                out.push('\n');
            }
        }

        Some(out.trim_end().to_string())
    }
}
