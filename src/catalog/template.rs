//! Template definitions as stored in the catalog file.

use serde::Deserialize;

use crate::options::ParamDef;

/// Image/text slot counts and option schema for a template.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TemplateParams {
    pub min_images: usize,
    pub max_images: usize,
    pub min_texts: usize,
    pub max_texts: usize,
    pub default_texts: Vec<String>,
    pub options: Vec<ParamDef>,
}

/// A named image-generation recipe.
#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    /// Unique engine-side key.
    pub key: String,

    /// Words that trigger this template in chat.
    #[serde(default)]
    pub keywords: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub params: TemplateParams,
}

impl Template {
    /// Whether `keyword` names this template.
    pub fn answers_to(&self, keyword: &str) -> bool {
        self.key == keyword || self.keywords.iter().any(|k| k == keyword)
    }
}
