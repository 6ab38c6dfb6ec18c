use serde::{Deserialize, Serialize};

use reliefdesk_core::ArticleId;

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Article,
    Aid,
    Project,
}

impl ItemType {
    pub const ALL: [ItemType; 3] = [ItemType::Article, ItemType::Aid, ItemType::Project];

    pub fn label(&self) -> &'static str {
        match self {
            ItemType::Article => "article",
            ItemType::Aid => "aid",
            ItemType::Project => "project",
        }
    }
}

/// Catalog article (immutable reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub name: String,
    /// Unit cost in minor currency units (e.g. cents).
    pub unit_cost: i64,
    pub item_type: ItemType,
    pub category: Option<String>,
}

impl Article {
    /// Denormalized snapshot for embedding into allocation line-items.
    pub fn to_ref(&self) -> ArticleRef {
        ArticleRef {
            id: self.id,
            name: self.name.clone(),
            unit_cost: self.unit_cost,
            item_type: self.item_type,
        }
    }
}

/// Denormalized article snapshot carried by allocation line-items.
///
/// Allocation records embed this at creation time so that demand aggregation
/// never has to join against the full catalog. A line-item whose snapshot is
/// absent references an article this core cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRef {
    pub id: ArticleId,
    pub name: String,
    /// Unit cost in minor currency units at snapshot time.
    pub unit_cost: i64,
    pub item_type: ItemType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_ref_copies_identity_and_cost() {
        let article = Article {
            id: ArticleId::new(),
            name: "Blankets".to_string(),
            unit_cost: 1_500,
            item_type: ItemType::Aid,
            category: Some("shelter".to_string()),
        };

        let snapshot = article.to_ref();
        assert_eq!(snapshot.id, article.id);
        assert_eq!(snapshot.name, "Blankets");
        assert_eq!(snapshot.unit_cost, 1_500);
        assert_eq!(snapshot.item_type, ItemType::Aid);
    }
}
