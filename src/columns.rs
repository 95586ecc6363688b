use derive_setters::Setters;

use crate::data::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accessor {
    FirstName,
    LastName,
    Age,
    Visits,
    Status,
    Progress,
}

impl Accessor {
    pub fn id(&self) -> &'static str {
        match self {
            Accessor::FirstName => "firstName",
            Accessor::LastName => "lastName",
            Accessor::Age => "age",
            Accessor::Visits => "visits",
            Accessor::Status => "status",
            Accessor::Progress => "progress",
        }
    }

    pub fn value(&self, row: &Row) -> String {
        match self {
            Accessor::FirstName => row.first_name.clone(),
            Accessor::LastName => row.last_name.clone(),
            Accessor::Age => row.age.to_string(),
            Accessor::Visits => row.visits.to_string(),
            Accessor::Status => row.status.to_string(),
            Accessor::Progress => row.progress.to_string(),
        }
    }
}

/// A leaf column. Unset bounds fall back to the table defaults.
#[derive(Debug, Clone, PartialEq, Setters)]
#[setters(strip_option)]
pub struct ColumnDef {
    #[setters(skip)]
    pub id: String,
    #[setters(into)]
    pub label: String,
    #[setters(skip)]
    pub accessor: Accessor,
    pub width: Option<u16>,
    pub min_width: Option<u16>,
    pub max_width: Option<u16>,
}

impl ColumnDef {
    pub fn new(label: &str, accessor: Accessor) -> Self {
        ColumnDef {
            id: accessor.id().to_string(),
            label: label.to_string(),
            accessor,
            width: None,
            min_width: None,
            max_width: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnNode {
    Group { label: String, children: Vec<ColumnNode> },
    Leaf(ColumnDef),
}

impl ColumnNode {
    pub fn group(label: &str, children: Vec<ColumnNode>) -> Self {
        ColumnNode::Group {
            label: label.to_string(),
            children,
        }
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a ColumnDef>) {
        match self {
            ColumnNode::Leaf(def) => out.push(def),
            ColumnNode::Group { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            ColumnNode::Leaf(_) => 1,
            ColumnNode::Group { children, .. } => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }
}

/// A label in the group header row covering `span` consecutive leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderGroup {
    pub label: String,
    pub first_leaf: usize,
    pub span: usize,
}

pub fn default_schema() -> Vec<ColumnNode> {
    vec![
        ColumnNode::group(
            "Name",
            vec![
                ColumnNode::Leaf(ColumnDef::new("First Name", Accessor::FirstName)),
                ColumnNode::Leaf(ColumnDef::new("Last Name", Accessor::LastName)),
            ],
        ),
        ColumnNode::group(
            "Info",
            vec![
                ColumnNode::Leaf(ColumnDef::new("Age", Accessor::Age).width(50)),
                ColumnNode::Leaf(ColumnDef::new("Visits", Accessor::Visits).width(60)),
                ColumnNode::Leaf(ColumnDef::new("Status", Accessor::Status)),
                ColumnNode::Leaf(ColumnDef::new("Profile Progress", Accessor::Progress)),
            ],
        ),
    ]
}

/// Leaf columns in display order.
pub fn leaves(schema: &[ColumnNode]) -> Vec<ColumnDef> {
    let mut out = Vec::new();
    for node in schema {
        node.collect_leaves(&mut out);
    }
    out.into_iter().cloned().collect()
}

/// Top level groups and the leaves they span. A top level leaf gets an
/// unlabeled placeholder so the group row lines up with the leaf row.
pub fn header_groups(schema: &[ColumnNode]) -> Vec<HeaderGroup> {
    let mut groups = Vec::with_capacity(schema.len());
    let mut first_leaf = 0;
    for node in schema {
        let span = node.leaf_count();
        let label = match node {
            ColumnNode::Group { label, .. } => label.clone(),
            ColumnNode::Leaf(_) => String::new(),
        };
        groups.push(HeaderGroup {
            label,
            first_leaf,
            span,
        });
        first_leaf += span;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Status;

    #[test]
    fn default_schema_leaves_in_order() {
        let ids: Vec<String> = leaves(&default_schema()).into_iter().map(|c| c.id).collect();
        assert_eq!(
            ids,
            vec!["firstName", "lastName", "age", "visits", "status", "progress"]
        );
    }

    #[test]
    fn fixed_widths_on_age_and_visits() {
        let cols = leaves(&default_schema());
        let widths: Vec<Option<u16>> = cols.iter().map(|c| c.width).collect();
        assert_eq!(widths, vec![None, None, Some(50), Some(60), None, None]);
    }

    #[test]
    fn groups_span_their_leaves() {
        let groups = header_groups(&default_schema());
        assert_eq!(
            groups,
            vec![
                HeaderGroup {
                    label: "Name".into(),
                    first_leaf: 0,
                    span: 2
                },
                HeaderGroup {
                    label: "Info".into(),
                    first_leaf: 2,
                    span: 4
                },
            ]
        );
    }

    #[test]
    fn nested_groups_flatten() {
        let schema = vec![
            ColumnNode::group(
                "Outer",
                vec![
                    ColumnNode::group(
                        "Inner",
                        vec![ColumnNode::Leaf(ColumnDef::new("Age", Accessor::Age))],
                    ),
                    ColumnNode::Leaf(ColumnDef::new("Status", Accessor::Status)),
                ],
            ),
            ColumnNode::Leaf(ColumnDef::new("Visits", Accessor::Visits).min_width(20)),
        ];
        assert_eq!(leaves(&schema).len(), 3);
        let groups = header_groups(&schema);
        assert_eq!(groups[0].span, 2);
        assert_eq!(groups[1].label, "");
        assert_eq!(groups[1].first_leaf, 2);
    }

    #[test]
    fn accessor_values() {
        let mut row = Row::new("Anna", "Lee", Status::Complicated);
        row.age = 12;
        assert_eq!(Accessor::FirstName.value(&row), "Anna");
        assert_eq!(Accessor::Age.value(&row), "12");
        assert_eq!(Accessor::Status.value(&row), "complicated");
    }
}
