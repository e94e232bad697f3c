//! Values a paginated operation returns, and the pagination arguments it
//! receives.

use {
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

use crate::{error::DecodeError, relay::IdSerializer};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<N> {
    pub node: N,
    pub cursor: String,
}

/// One page of a connection, serialized in the shape the generated
/// connection types read: `{ edges: [{ node, cursor }], pageInfo }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
}

impl<N> Page<N> {
    #[must_use]
    pub fn new(edges: Vec<Edge<N>>, has_next_page: bool, has_previous_page: bool) -> Self {
        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };
        Self { edges, page_info }
    }

    pub fn from_nodes<F>(
        nodes: impl IntoIterator<Item = N>,
        cursor: F,
        has_next_page: bool,
        has_previous_page: bool,
    ) -> Self
    where
        F: Fn(&N) -> String,
    {
        let edges = nodes
            .into_iter()
            .map(|node| Edge {
                cursor: cursor(&node),
                node,
            })
            .collect();
        Self::new(edges, has_next_page, has_previous_page)
    }

    /// A page cut from a larger ordered collection. Cursors are the 1-based
    /// absolute positions of the nodes.
    ///
    /// `offset` usually comes straight from a client cursor, so positions
    /// saturate instead of overflowing.
    #[must_use]
    pub fn offset_based(nodes: Vec<N>, total_count: u64, offset: u64) -> Self {
        let len = nodes.len() as u64;
        let edges = nodes
            .into_iter()
            .enumerate()
            .map(|(index, node)| Edge {
                node,
                cursor: offset
                    .saturating_add(index as u64)
                    .saturating_add(1)
                    .to_string(),
            })
            .collect();
        Self::new(
            edges,
            offset.saturating_add(len) < total_count,
            offset > 0 && total_count > 0,
        )
    }

    /// A page cut from a collection ordered by id. Cursors are the node ids
    /// written by `serializer`; there is more on either side when the first
    /// or last id lies strictly inside `min..=max`.
    pub fn id_based<I, F>(
        nodes: Vec<N>,
        id: F,
        min: &I,
        max: &I,
        serializer: &dyn IdSerializer,
    ) -> Result<Self, DecodeError>
    where
        I: Ord + Serialize,
        F: Fn(&N) -> I,
    {
        let (Some(first), Some(last)) = (nodes.first(), nodes.last()) else {
            return Ok(Self::empty());
        };
        let has_next_page = id(last) < *max;
        let has_previous_page = id(first) > *min;

        let mut edges = Vec::with_capacity(nodes.len());
        for node in nodes {
            let raw = serde_json::to_value(id(&node))
                .map_err(|e| DecodeError::unserializable_id(e.to_string()))?;
            edges.push(Edge {
                cursor: serializer.serialize(&raw)?,
                node,
            });
        }
        Ok(Self::new(edges, has_next_page, has_previous_page))
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), false, false)
    }
}

impl<N: Serialize> Page<N> {
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// The four synthesized pagination arguments, read back out of a decoded
/// argument map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationArgs {
    pub first: Option<u64>,
    pub after: Option<String>,
    pub last: Option<u64>,
    pub before: Option<String>,
}

impl PaginationArgs {
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, DecodeError> {
        Ok(Self {
            first: count(arguments, "first")?,
            after: cursor(arguments, "after")?,
            last: count(arguments, "last")?,
            before: cursor(arguments, "before")?,
        })
    }

    /// Offset implied by the `after` cursor of an offset-based page.
    pub fn offset(&self) -> Result<u64, DecodeError> {
        match &self.after {
            None => Ok(0),
            Some(after) => after.parse::<u64>().map_err(|_| {
                DecodeError::invalid_pagination(format!("'{after}' is not a valid cursor"))
            }),
        }
    }
}

fn count(arguments: &Map<String, Value>, name: &str) -> Result<Option<u64>, DecodeError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_u64().map(Some).ok_or_else(|| {
            DecodeError::invalid_pagination(format!("'{name}' must be a non-negative integer"))
        }),
    }
}

fn cursor(arguments: &Map<String, Value>, name: &str) -> Result<Option<String>, DecodeError> {
    match arguments.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::invalid_pagination(format!(
            "'{name}' must be a cursor string"
        ))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use {
        super::*,
        crate::relay::{JsonIdSerializer, PlainIdSerializer},
        serde_json::json,
    };

    #[test]
    fn offset_pages_use_absolute_positions() {
        let page = Page::offset_based(vec!["c", "d"], 5, 2);
        let cursors: Vec<_> = page.edges.iter().map(|e| e.cursor.as_str()).collect();
        assert_eq!(cursors, ["3", "4"]);
        assert!(page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);
        assert_eq!(page.page_info.start_cursor.as_deref(), Some("3"));
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("4"));
    }

    #[test]
    fn first_and_last_pages() {
        let first = Page::offset_based(vec![1, 2], 3, 0);
        assert!(first.page_info.has_next_page);
        assert!(!first.page_info.has_previous_page);

        let last = Page::offset_based(vec![3], 3, 2);
        assert!(!last.page_info.has_next_page);

        let nothing = Page::<i32>::offset_based(Vec::new(), 0, 4);
        assert!(!nothing.page_info.has_previous_page);
        assert_eq!(nothing.page_info.start_cursor, None);
    }

    #[test]
    fn client_cursors_past_the_end_do_not_overflow() {
        let args = PaginationArgs {
            after: Some(u64::MAX.to_string()),
            ..Default::default()
        };
        let offset = args.offset().unwrap();

        let empty = Page::<i32>::offset_based(Vec::new(), 5, offset);
        assert!(!empty.page_info.has_next_page);
        assert!(empty.page_info.has_previous_page);

        let page = Page::offset_based(vec!["x", "y"], 5, offset - 1);
        let cursors: Vec<_> = page.edges.iter().map(|e| e.cursor.as_str()).collect();
        assert_eq!(cursors, [u64::MAX.to_string(), u64::MAX.to_string()]);
        assert!(!page.page_info.has_next_page);
    }

    #[test]
    fn id_pages_compare_against_the_global_range() {
        let nodes = vec![json!({"id": 3}), json!({"id": 4})];
        let id = |n: &Value| n["id"].as_u64().unwrap_or_default();

        let page = Page::id_based(nodes.clone(), id, &1, &9, &PlainIdSerializer).unwrap();
        let cursors: Vec<_> = page.edges.iter().map(|e| e.cursor.as_str()).collect();
        assert_eq!(cursors, ["3", "4"]);
        assert!(page.page_info.has_next_page);
        assert!(page.page_info.has_previous_page);

        let whole = Page::id_based(nodes, id, &3, &4, &PlainIdSerializer).unwrap();
        assert!(!whole.page_info.has_next_page);
        assert!(!whole.page_info.has_previous_page);

        let keyed = Page::id_based(
            vec![json!({"id": 7})],
            |n: &Value| (n["id"].to_string(), 1),
            &(String::new(), 0),
            &("z".to_string(), 0),
            &JsonIdSerializer,
        )
        .unwrap();
        assert_eq!(keyed.edges[0].cursor, r#"["7",1]"#);

        let none = Page::<Value>::id_based(Vec::new(), id, &1, &9, &PlainIdSerializer).unwrap();
        assert_eq!(none, Page::empty());
    }

    #[test]
    fn serializes_in_connection_shape() {
        let page = Page::from_nodes([json!({"id": 1})], |n| format!("c{}", n["id"]), false, true);
        assert_eq!(
            page.to_value().unwrap(),
            json!({
                "edges": [{"node": {"id": 1}, "cursor": "c1"}],
                "pageInfo": {
                    "hasNextPage": false,
                    "hasPreviousPage": true,
                    "startCursor": "c1",
                    "endCursor": "c1"
                }
            })
        );
        assert_eq!(Page::<Value>::empty().edges.len(), 0);
    }

    #[test]
    fn pagination_args_parse_and_reject_negatives() {
        let args = json!({"first": 10, "after": "20", "before": null});
        let parsed = PaginationArgs::from_arguments(args.as_object().unwrap()).unwrap();
        assert_eq!(parsed.first, Some(10));
        assert_eq!(parsed.offset().unwrap(), 20);
        assert_eq!(parsed.before, None);

        let negative = json!({"last": -1});
        let err = PaginationArgs::from_arguments(negative.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidPagination { .. }));

        let bad_cursor = PaginationArgs {
            after: Some("abc".into()),
            ..Default::default()
        };
        assert!(bad_cursor.offset().is_err());
    }
}
