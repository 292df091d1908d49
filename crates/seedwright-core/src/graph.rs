use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, warn};

use crate::schema::{ColumnMetadata, RawTable};

/// Foreign key declared on a single column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeyRef {
    pub column: String,
    /// Referenced table; `None` when introspection did not report one.
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
}

/// Per-table metadata derived from the raw snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMetadata {
    pub name: String,
    pub columns: Vec<ColumnMetadata>,
    /// First column tagged `PRIMARY KEY`.
    pub primary_key: Option<String>,
    pub foreign_keys: Vec<ForeignKeyRef>,
    /// Referenced tables that exist in the analyzed schema.
    pub dependencies: Vec<String>,
}

impl TableMetadata {
    pub fn column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKeyRef> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}

/// Dependency edge dropped while ordering because it closes a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEdge {
    pub table: String,
    pub depends_on: String,
}

/// Insertion order plus the edges that could not be honoured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertionOrder {
    pub tables: Vec<String>,
    pub skipped_edges: Vec<SkippedEdge>,
}

/// Analyzed schema: table metadata indexed by name, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaGraph {
    tables: Vec<TableMetadata>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl SchemaGraph {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Tables in snapshot order.
    pub fn tables(&self) -> impl Iterator<Item = &TableMetadata> {
        self.tables.iter()
    }

    pub fn table(&self, name: &str) -> Option<&TableMetadata> {
        self.index.get(name).map(|idx| &self.tables[*idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Table name -> dependency list (possibly empty).
    pub fn dependency_map(&self) -> BTreeMap<&str, &[String]> {
        self.tables
            .iter()
            .map(|table| (table.name.as_str(), table.dependencies.as_slice()))
            .collect()
    }

    /// Tables ordered so that every table follows the tables it depends on.
    pub fn insertion_order(&self) -> Vec<String> {
        self.ordering().tables
    }

    /// Dependency edges dropped to break foreign-key cycles.
    pub fn skipped_edges(&self) -> Vec<SkippedEdge> {
        self.ordering().skipped_edges
    }

    /// Depth-first ordering that tolerates cycles.
    ///
    /// Roots and dependencies are visited in snapshot order. An edge into a
    /// table that is still being visited closes a cycle; it is skipped and
    /// reported, and the table it came from is emitted once its remaining
    /// dependencies are done.
    pub fn ordering(&self) -> InsertionOrder {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: Vec<Option<Mark>> = vec![None; self.tables.len()];
        let mut tables = Vec::with_capacity(self.tables.len());
        let mut skipped_edges = Vec::new();

        for root in 0..self.tables.len() {
            if marks[root].is_some() {
                continue;
            }

            marks[root] = Some(Mark::Visiting);
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some(&(node, cursor)) = stack.last() {
                let Some(dependency) = self.tables[node].dependencies.get(cursor) else {
                    stack.pop();
                    tables.push(self.tables[node].name.clone());
                    marks[node] = Some(Mark::Done);
                    continue;
                };

                if let Some(frame) = stack.last_mut() {
                    frame.1 += 1;
                }

                let Some(&next) = self.index.get(dependency) else {
                    continue;
                };

                match marks[next] {
                    None => {
                        marks[next] = Some(Mark::Visiting);
                        stack.push((next, 0));
                    }
                    Some(Mark::Visiting) => {
                        let table = &self.tables[node].name;
                        if next == node {
                            debug!(table = %table, "self-referencing foreign key");
                        } else {
                            warn!(
                                table = %table,
                                depends_on = %dependency,
                                "foreign key cycle; dependency edge skipped"
                            );
                        }
                        skipped_edges.push(SkippedEdge {
                            table: table.clone(),
                            depends_on: dependency.clone(),
                        });
                    }
                    Some(Mark::Done) => {}
                }
            }
        }

        InsertionOrder {
            tables,
            skipped_edges,
        }
    }
}

/// Build the schema graph from a raw introspection snapshot.
///
/// Never fails: foreign keys pointing at tables outside the snapshot keep
/// their foreign-key entry but contribute no dependency edge. When the
/// snapshot repeats a table name, the first occurrence wins.
pub fn analyze_schema(raw_tables: &[RawTable]) -> SchemaGraph {
    let known: HashSet<&str> = raw_tables.iter().map(|table| table.name.as_str()).collect();
    let mut graph = SchemaGraph::default();

    for raw in raw_tables {
        if graph.index.contains_key(&raw.name) {
            warn!(table = %raw.name, "duplicate table in snapshot ignored");
            continue;
        }

        let mut primary_key = None;
        let mut foreign_keys = Vec::new();
        let mut dependencies: Vec<String> = Vec::new();
        let mut columns = Vec::with_capacity(raw.columns.len());

        for raw_column in &raw.columns {
            let column = ColumnMetadata::from_raw(raw_column);

            if column.is_primary_key() && primary_key.is_none() {
                primary_key = Some(column.name.clone());
            }

            if column.is_foreign_key() {
                if let Some(target) = column.foreign_table.as_deref()
                    && known.contains(target)
                    && !dependencies.iter().any(|dep| dep == target)
                {
                    dependencies.push(target.to_string());
                }
                foreign_keys.push(ForeignKeyRef {
                    column: column.name.clone(),
                    foreign_table: column.foreign_table.clone(),
                    foreign_column: column.foreign_column.clone(),
                });
            }

            columns.push(column);
        }

        graph.index.insert(raw.name.clone(), graph.tables.len());
        graph.tables.push(TableMetadata {
            name: raw.name.clone(),
            columns,
            primary_key,
            foreign_keys,
            dependencies,
        });
    }

    graph
}
