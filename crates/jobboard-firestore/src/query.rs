//! Structured query builder.

use crate::types::{
    CollectionSelector, CompositeFilter, FieldFilter, FieldReference, Filter, Order, StructuredQuery, Value,
};

/// Firestore caps the `IN` operator at 30 values.
pub const MAX_IN_VALUES: usize = 30;

/// Sort direction for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Get the Firestore direction string.
    pub const fn firestore_direction(&self) -> &'static str {
        match self {
            Self::Ascending => "ASCENDING",
            Self::Descending => "DESCENDING",
        }
    }
}

/// Builds a [`StructuredQuery`] over one top-level collection.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    collection: String,
    filters: Vec<FieldFilter>,
    order_by: Vec<Order>,
    limit: Option<i32>,
}

impl QueryBuilder {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    fn field_filter(mut self, field: &str, op: &str, value: Value) -> Self {
        self.filters.push(FieldFilter {
            field: FieldReference {
                field_path: field.to_string(),
            },
            op: op.to_string(),
            value,
        });
        self
    }

    /// `field == value`
    pub fn eq(self, field: &str, value: Value) -> Self {
        self.field_filter(field, "EQUAL", value)
    }

    /// `field == value` when `value` is present.
    pub fn eq_opt(self, field: &str, value: Option<Value>) -> Self {
        match value {
            Some(value) => self.eq(field, value),
            None => self,
        }
    }

    /// `field IN values`. At most [`MAX_IN_VALUES`] values.
    pub fn is_in(self, field: &str, values: Vec<Value>) -> Self {
        let array = Value::ArrayValue(crate::types::ArrayValue { values: Some(values) });
        self.field_filter(field, "IN", array)
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by.push(Order {
            field: FieldReference {
                field_path: field.to_string(),
            },
            direction: direction.firestore_direction().to_string(),
        });
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> StructuredQuery {
        let mut filters: Vec<Filter> = self
            .filters
            .into_iter()
            .map(|f| Filter {
                composite_filter: None,
                field_filter: Some(f),
            })
            .collect();

        let r#where = match filters.len() {
            0 => None,
            1 => filters.pop(),
            _ => Some(Filter {
                composite_filter: Some(CompositeFilter {
                    op: "AND".to_string(),
                    filters,
                }),
                field_filter: None,
            }),
        };

        StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: self.collection,
                all_descendants: None,
            }],
            r#where,
            order_by: (!self.order_by.is_empty()).then_some(self.order_by),
            start_at: None,
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToFirestoreValue;

    #[test]
    fn test_single_filter_is_not_wrapped() {
        let query = QueryBuilder::collection("jobs")
            .eq("status", "published".to_firestore_value())
            .build();
        let filter = query.r#where.unwrap();
        assert!(filter.composite_filter.is_none());
        assert_eq!(filter.field_filter.unwrap().op, "EQUAL");
    }

    #[test]
    fn test_multiple_filters_are_anded() {
        let query = QueryBuilder::collection("applications")
            .eq("status", "pending".to_firestore_value())
            .is_in("job_id", vec!["a".to_firestore_value(), "b".to_firestore_value()])
            .order_by("created_at", SortDirection::Descending)
            .build();
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["where"]["compositeFilter"]["op"], "AND");
        assert_eq!(json["where"]["compositeFilter"]["filters"][1]["fieldFilter"]["op"], "IN");
        assert_eq!(json["orderBy"][0]["direction"], "DESCENDING");
    }

    #[test]
    fn test_eq_opt_skips_none() {
        let query = QueryBuilder::collection("profiles").eq_opt("role", None).build();
        assert!(query.r#where.is_none());
        assert!(query.order_by.is_none());
    }
}
