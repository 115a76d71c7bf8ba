//! Fabric catalog filtering and field validation.
//!
//! The catalog is small, so listing loads the rows once and narrows them
//! with a chain of predicates applied in a fixed order. A fabric is kept
//! only if every active predicate accepts it.

use serde::Deserialize;

use crate::error::CoreError;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_TYPE_LEN: usize = 50;

pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Read access to the catalog attributes a filter looks at.
pub trait CatalogItem {
    fn name(&self) -> &str;
    fn fabric_type(&self) -> &str;
    fn color(&self) -> Option<&str>;
    fn pattern(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn price_per_meter(&self) -> f64;
    fn in_stock(&self) -> bool;
}

/// Optional catalog filters, typically deserialized from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FabricFilter {
    #[serde(rename = "type")]
    pub fabric_type: Option<String>,
    pub color: Option<String>,
    pub pattern: Option<String>,
    pub in_stock: Option<bool>,
    pub search: Option<String>,
    pub max_price: Option<f64>,
}

fn eq_ignore_case(actual: Option<&str>, wanted: &str) -> bool {
    actual.is_some_and(|a| a.trim().eq_ignore_ascii_case(wanted.trim()))
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl FabricFilter {
    /// Apply each active predicate in turn.
    pub fn matches<T: CatalogItem>(&self, item: &T) -> bool {
        if let Some(t) = non_blank(&self.fabric_type) {
            if !eq_ignore_case(Some(item.fabric_type()), t) {
                return false;
            }
        }
        if let Some(c) = non_blank(&self.color) {
            if !eq_ignore_case(item.color(), c) {
                return false;
            }
        }
        if let Some(p) = non_blank(&self.pattern) {
            if !eq_ignore_case(item.pattern(), p) {
                return false;
            }
        }
        if let Some(in_stock) = self.in_stock {
            if item.in_stock() != in_stock {
                return false;
            }
        }
        if let Some(q) = non_blank(&self.search) {
            let q = q.to_lowercase();
            let in_name = item.name().to_lowercase().contains(&q);
            let in_desc = item
                .description()
                .is_some_and(|d| d.to_lowercase().contains(&q));
            if !in_name && !in_desc {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if item.price_per_meter() > max {
                return false;
            }
        }
        true
    }

    /// Keep the items that pass every predicate, preserving order.
    pub fn apply<T: CatalogItem>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().filter(|i| self.matches(i)).collect()
    }
}

/// Validate the user-editable fabric fields shared by create and update.
pub fn validate_fabric(
    name: Option<&str>,
    fabric_type: Option<&str>,
    price_per_meter: Option<f64>,
) -> Result<(), CoreError> {
    if let Some(name) = name {
        let len = name.trim().chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(CoreError::Validation(format!(
                "name must be between 1 and {MAX_NAME_LEN} characters"
            )));
        }
    }
    if let Some(t) = fabric_type {
        let len = t.trim().chars().count();
        if len == 0 || len > MAX_TYPE_LEN {
            return Err(CoreError::Validation(format!(
                "type must be between 1 and {MAX_TYPE_LEN} characters"
            )));
        }
    }
    if let Some(price) = price_per_meter {
        if !price.is_finite() || price <= 0.0 {
            return Err(CoreError::Validation(
                "price_per_meter must be greater than zero".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        name: &'static str,
        kind: &'static str,
        color: Option<&'static str>,
        pattern: Option<&'static str>,
        description: Option<&'static str>,
        price: f64,
        in_stock: bool,
    }

    impl CatalogItem for Item {
        fn name(&self) -> &str {
            self.name
        }
        fn fabric_type(&self) -> &str {
            self.kind
        }
        fn color(&self) -> Option<&str> {
            self.color
        }
        fn pattern(&self) -> Option<&str> {
            self.pattern
        }
        fn description(&self) -> Option<&str> {
            self.description
        }
        fn price_per_meter(&self) -> f64 {
            self.price
        }
        fn in_stock(&self) -> bool {
            self.in_stock
        }
    }

    fn catalog() -> Vec<Item> {
        vec![
            Item {
                name: "Raymond Fine Wool",
                kind: "Wool",
                color: Some("Navy Blue"),
                pattern: Some("Solid"),
                description: Some("Premium merino wool for business suits."),
                price: 2500.0,
                in_stock: true,
            },
            Item {
                name: "Linen Breeze",
                kind: "Linen",
                color: Some("Beige"),
                pattern: Some("Solid"),
                description: Some("Breathable pure linen for summer."),
                price: 1800.0,
                in_stock: true,
            },
            Item {
                name: "Royal Velvet",
                kind: "Velvet",
                color: Some("Deep Maroon"),
                pattern: None,
                description: None,
                price: 3500.0,
                in_stock: false,
            },
        ]
    }

    fn names(items: Vec<Item>) -> Vec<&'static str> {
        items.into_iter().map(|i| i.name).collect()
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let out = FabricFilter::default().apply(catalog());
        assert_eq!(
            names(out),
            vec!["Raymond Fine Wool", "Linen Breeze", "Royal Velvet"]
        );
    }

    #[test]
    fn filters_compose() {
        let filter = FabricFilter {
            pattern: Some("solid".into()),
            in_stock: Some(true),
            max_price: Some(2000.0),
            ..Default::default()
        };
        assert_eq!(names(filter.apply(catalog())), vec!["Linen Breeze"]);
    }

    #[test]
    fn type_match_is_case_insensitive_and_exact() {
        let filter = FabricFilter {
            fabric_type: Some("WOOL".into()),
            ..Default::default()
        };
        assert_eq!(names(filter.apply(catalog())), vec!["Raymond Fine Wool"]);

        let partial = FabricFilter {
            fabric_type: Some("Wo".into()),
            ..Default::default()
        };
        assert!(partial.apply(catalog()).is_empty());
    }

    #[test]
    fn search_looks_at_name_and_description() {
        let by_desc = FabricFilter {
            search: Some("SUMMER".into()),
            ..Default::default()
        };
        assert_eq!(names(by_desc.apply(catalog())), vec!["Linen Breeze"]);

        let by_name = FabricFilter {
            search: Some("velvet".into()),
            ..Default::default()
        };
        assert_eq!(names(by_name.apply(catalog())), vec!["Royal Velvet"]);
    }

    #[test]
    fn missing_attribute_fails_its_predicate() {
        let filter = FabricFilter {
            pattern: Some("Solid".into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(catalog()).len(), 2);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let filter = FabricFilter {
            color: Some("  ".into()),
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter.apply(catalog()).len(), 3);
    }

    #[test]
    fn validation_bounds() {
        assert!(validate_fabric(Some("Silk"), Some("Silk"), Some(10.0)).is_ok());
        assert!(validate_fabric(Some(""), None, None).is_err());
        assert!(validate_fabric(None, Some(&"x".repeat(51)), None).is_err());
        assert!(validate_fabric(None, None, Some(0.0)).is_err());
        assert!(validate_fabric(None, None, None).is_ok());
    }
}
