/// Options that control how introspection behaves.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// Namespace whose base tables are read.
    pub schema: String,
    /// Tables left out of the snapshot.
    pub exclude_tables: Vec<String>,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            schema: "public".to_string(),
            exclude_tables: Vec::new(),
        }
    }
}

impl IntrospectOptions {
    pub fn for_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            ..Self::default()
        }
    }

    pub(crate) fn includes(&self, table: &str) -> bool {
        !self.exclude_tables.iter().any(|excluded| excluded == table)
    }
}
