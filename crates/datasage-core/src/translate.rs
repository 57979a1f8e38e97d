//! Pseudo natural-language to SQL translation
//!
//! Requests are matched against ordered keyword-group rules. A rule matches
//! only when every one of its groups has a hit; there is no partial matching.

use serde::{Deserialize, Serialize};

use crate::chat::normalize;
use crate::facts::FactTarget;

/// Query shapes the translator can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryShape {
    RowCount,
    TopByRegion,
    TopByLocality,
    SelectAll,
}

impl QueryShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryShape::RowCount => "row_count",
            QueryShape::TopByRegion => "top_by_region",
            QueryShape::TopByLocality => "top_by_locality",
            QueryShape::SelectAll => "select_all",
        }
    }
}

/// Each group is a set of synonyms; all groups must be present
#[derive(Debug, Clone, Copy)]
pub struct ShapeRule {
    pub shape: QueryShape,
    pub groups: [&'static [&'static str]; 2],
}

impl ShapeRule {
    pub fn matches(&self, normalized: &str) -> bool {
        self.groups
            .iter()
            .all(|group| group.iter().any(|k| normalized.contains(k)))
    }
}

/// Evaluated top to bottom; anything unmatched becomes `SelectAll`
pub const SHAPE_RULES: &[ShapeRule] = &[
    ShapeRule {
        shape: QueryShape::RowCount,
        groups: [&["count", "how many"], &["customer"]],
    },
    ShapeRule {
        shape: QueryShape::TopByRegion,
        groups: [&["state"], &["customer"]],
    },
    ShapeRule {
        shape: QueryShape::TopByLocality,
        groups: [&["city"], &["customer"]],
    },
];

/// Grouped queries return this many rows
pub const TOP_GROUP_LIMIT: usize = 5;
/// Row bound of the fallback select
pub const FALLBACK_LIMIT: usize = 10;

/// SQL produced for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub shape: QueryShape,
    pub sql: String,
}

/// Emits literal SQL for the designated table
#[derive(Debug, Clone, Default)]
pub struct Translator {
    target: FactTarget,
}

impl Translator {
    pub fn new(target: FactTarget) -> Self {
        Self { target }
    }

    pub fn classify(&self, text: &str) -> QueryShape {
        let normalized = normalize(text);
        SHAPE_RULES
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.shape)
            .unwrap_or(QueryShape::SelectAll)
    }

    pub fn render(&self, shape: QueryShape) -> String {
        let table = &self.target.table;
        match shape {
            QueryShape::RowCount => format!("SELECT COUNT(*) FROM {};", table),
            QueryShape::TopByRegion => self.top_by(&self.target.region_column),
            QueryShape::TopByLocality => self.top_by(&self.target.locality_column),
            QueryShape::SelectAll => format!("SELECT * FROM {} LIMIT {};", table, FALLBACK_LIMIT),
        }
    }

    /// `schema` is accepted as context but the base rules do not consult it
    pub fn translate(&self, text: &str, _schema: &str) -> Translation {
        let shape = self.classify(text);
        Translation {
            shape,
            sql: self.render(shape),
        }
    }

    fn top_by(&self, column: &str) -> String {
        format!(
            "SELECT {col}, COUNT(*) as count FROM {table} GROUP BY {col} ORDER BY count DESC LIMIT {limit};",
            col = column,
            table = self.target.table,
            limit = TOP_GROUP_LIMIT
        )
    }
}

/// Translate with the default `customers` target
pub fn translate(text: &str, schema: &str) -> String {
    Translator::default().translate(text, schema).sql
}
