use crate::error::{AppError, Result};
use crate::utils::security::validate_label_dir;
use serde::Serialize;
use std::path::Path;

/// One category an image can be sorted into. `index` is 1-based and follows
/// line order in the labels file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub index: usize,
    pub text: String,
}

/// Ordered, immutable set of labels loaded once at startup.
#[derive(Debug, Clone)]
pub struct LabelRegistry {
    labels: Vec<Label>,
}

impl LabelRegistry {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::ConfigError {
                message: format!("Failed to read labels from {}: {}", path.display(), e),
            })?;

        let labels = parse_lines(&content)?;
        if labels.is_empty() {
            return Err(AppError::ConfigError {
                message: format!("no labels found in {}", path.display()),
            });
        }

        Ok(Self { labels })
    }

    /// Builds a registry from label text, one label per line. Lines are
    /// trimmed, blank lines skipped, duplicates kept.
    pub fn parse(content: &str) -> Result<Self> {
        let labels = parse_lines(content)?;
        if labels.is_empty() {
            return Err(AppError::ConfigError {
                message: "no labels found".to_string(),
            });
        }

        Ok(Self { labels })
    }

    /// Looks up a label by its 1-based index.
    pub fn get(&self, index: usize) -> Option<&Label> {
        index.checked_sub(1).and_then(|i| self.labels.get(i))
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn parse_lines(content: &str) -> Result<Vec<Label>> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, text)| {
            validate_label_dir(text)?;
            Ok(Label {
                index: i + 1,
                text: text.to_string(),
            })
        })
        .collect()
}
