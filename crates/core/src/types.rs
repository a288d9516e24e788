use serde::{Deserialize, Serialize};

/// A named grouping that products reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Folds a category name into the form stored in the unique `name_key` column.
///
/// Two names collide exactly when their keys are equal.
pub fn category_name_key(name: &str) -> String {
    name.to_lowercase()
}

/// A catalog item belonging to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
}

/// Product joined with its category for list views.
///
/// `category` is `None` only when the referenced row is missing, which the
/// schema prevents for data written through this application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl From<ProductListing> for Product {
    fn from(listing: ProductListing) -> Self {
        Self {
            id: listing.id,
            name: listing.name,
            category_id: listing.category_id,
        }
    }
}

/// Validated input for creating or updating a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryInput {
    pub name: String,
}

impl CategoryInput {
    pub fn name_key(&self) -> String {
        category_name_key(&self.name)
    }
}

/// Validated input for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductInput {
    pub name: String,
    pub category_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_key_ignores_letter_case() {
        assert_eq!(category_name_key("Tools"), category_name_key("tOOLS"));
        assert_ne!(category_name_key("Tools"), category_name_key("Tool"));
    }

    #[test]
    fn name_key_folds_non_ascii_letters() {
        assert_eq!(category_name_key("ÉCROUS"), "écrous");
    }

    #[test]
    fn listing_serializes_joined_category() {
        let listing = ProductListing {
            id: 1,
            name: "Hammer".to_string(),
            category_id: 7,
            category: Some(Category {
                id: 7,
                name: "Tools".to_string(),
            }),
        };

        let value = serde_json::to_value(&listing).expect("serialize");
        assert_eq!(value["category"]["name"], "Tools");
        assert_eq!(value["categoryId"], 7);

        let product = Product::from(listing);
        assert_eq!(product.category_id, 7);
    }

    #[test]
    fn listing_omits_missing_category() {
        let listing = ProductListing {
            id: 2,
            name: "Orphan".to_string(),
            category_id: 99,
            category: None,
        };

        let value = serde_json::to_value(&listing).expect("serialize");
        assert!(value.get("category").is_none());
    }
}
