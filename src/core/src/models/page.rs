//! List response envelopes.
//!
//! Collection and filter endpoints answer either with a bare JSON array or
//! with a page envelope `{count, next, previous, results}`.

use serde::{Deserialize, Serialize};

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Either shape a list endpoint may return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Items(Vec<T>),
    Page(Page<T>),
}

impl<T> ListPayload<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Self::Items(items) => items,
            Self::Page(page) => page.results,
        }
    }

    /// Whether the backend reported more results beyond this page.
    pub fn has_more(&self) -> bool {
        matches!(self, Self::Page(Page { next: Some(_), .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let payload: ListPayload<u32> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        assert!(!payload.has_more());
        assert_eq!(payload.into_items(), vec![1, 2, 3]);
    }

    #[test]
    fn test_page_envelope() {
        let payload: ListPayload<u32> = serde_json::from_value(json!({
            "count": 30,
            "next": "http://localhost:8000/api/projects/?page=2",
            "previous": null,
            "results": [1, 2]
        }))
        .unwrap();
        assert!(payload.has_more());
        assert_eq!(payload.into_items(), vec![1, 2]);
    }

    #[test]
    fn test_empty_object_is_not_a_list() {
        assert!(serde_json::from_value::<ListPayload<u32>>(json!({})).is_err());
    }
}
