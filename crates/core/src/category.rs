use serde::{Deserialize, Serialize};

use crate::transaction::TransactionRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keyword: String,
    pub category: String,
}

impl CategoryRule {
    pub fn new(keyword: &str, category: &str) -> Self {
        CategoryRule {
            keyword: keyword.to_string(),
            category: category.to_string(),
        }
    }
}

/// Keyword categorizer. Rules are tried in the order given and the first
/// keyword found in the uppercased description wins, so a broad keyword
/// listed ahead of a narrower one shadows it.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter(|r| !r.keyword.trim().is_empty())
            .map(|r| CategoryRule {
                keyword: r.keyword.to_uppercase(),
                category: r.category,
            })
            .collect();
        Self { rules }
    }

    pub fn categorize(&self, description: &str) -> &str {
        let text = description.to_uppercase();
        self.rules
            .iter()
            .find(|r| text.contains(&r.keyword))
            .map(|r| r.category.as_str())
            .unwrap_or("")
    }

    pub fn apply(&self, records: &mut [TransactionRecord]) {
        for record in records {
            record.category = self.categorize(&record.description).to_string();
        }
    }
}
