use chrono::NaiveDateTime;
use rand::{Rng, RngCore};
use tracing::{debug, warn};

use seedwright_core::{ColumnMetadata, TableMetadata};

use crate::config::TableConfig;
use crate::foreign::ForeignKeyPool;
use crate::generators::{GeneratedRecord, GeneratedValue, GeneratorContext, generate_value};
use crate::model::DEFAULT_NULL_PROBABILITY;

/// Settings applied while generating one table.
#[derive(Debug, Clone, Copy)]
pub struct TableOptions<'a> {
    /// Per-column overrides for this table.
    pub config: Option<&'a TableConfig>,
    pub null_probability: f64,
    pub reference_time: NaiveDateTime,
}

impl<'a> TableOptions<'a> {
    pub fn new(reference_time: NaiveDateTime) -> Self {
        Self {
            config: None,
            null_probability: DEFAULT_NULL_PROBABILITY,
            reference_time,
        }
    }

    pub fn with_config(mut self, config: Option<&'a TableConfig>) -> Self {
        self.config = config;
        self
    }

    pub fn with_null_probability(mut self, probability: f64) -> Self {
        self.null_probability = probability;
        self
    }
}

/// Generate `count` records for `table`.
///
/// Auto-increment primary keys are left to the database. Foreign-key
/// columns draw from `pool` when it holds values for the referenced column
/// and fall back to their type generator otherwise. Nullable columns are
/// `NULL` with `null_probability`, foreign keys included.
pub fn generate_table_data<R: RngCore>(
    table: &TableMetadata,
    count: usize,
    options: &TableOptions<'_>,
    pool: &ForeignKeyPool,
    rng: &mut R,
) -> Vec<GeneratedRecord> {
    let rng: &mut dyn RngCore = rng;
    let null_probability = sanitize_probability(&table.name, options.null_probability);

    let plans: Vec<ColumnPlan<'_>> = table
        .columns
        .iter()
        .filter(|column| !column.is_auto_increment())
        .map(|column| ColumnPlan::new(table, column, options))
        .collect();

    debug!(
        table = %table.name,
        records = count,
        columns = plans.len(),
        skipped = table.columns.len() - plans.len(),
        "generating records"
    );

    (0..count)
        .map(|_| {
            plans
                .iter()
                .map(|plan| {
                    let value = plan.generate(null_probability, pool, rng);
                    (plan.ctx.column.name.as_str(), value)
                })
                .collect::<GeneratedRecord>()
        })
        .collect()
}

struct ColumnPlan<'a> {
    ctx: GeneratorContext<'a>,
    /// Referenced `(table, column)` for foreign-key columns.
    reference: Option<(&'a str, Option<&'a str>)>,
}

impl<'a> ColumnPlan<'a> {
    fn new(table: &'a TableMetadata, column: &'a ColumnMetadata, options: &TableOptions<'a>) -> Self {
        let column_options = options.config.and_then(|config| config.column(&column.name));
        let reference = table.foreign_key(&column.name).and_then(|fk| {
            fk.foreign_table
                .as_deref()
                .map(|target| (target, fk.foreign_column.as_deref()))
        });

        Self {
            ctx: GeneratorContext::new(&table.name, column, column_options, options.reference_time),
            reference,
        }
    }

    fn generate(
        &self,
        null_probability: f64,
        pool: &ForeignKeyPool,
        rng: &mut dyn RngCore,
    ) -> GeneratedValue {
        if self.ctx.column.nullable && rng.random_bool(null_probability) {
            return GeneratedValue::Null;
        }
        if let Some((table, column)) = self.reference
            && let Some(value) = pool.pick(table, column, rng)
        {
            return value;
        }
        generate_value(&self.ctx, rng)
    }
}

fn sanitize_probability(table: &str, probability: f64) -> f64 {
    if !probability.is_finite() {
        warn!(table = %table, probability, "null probability is not finite; using default");
        return DEFAULT_NULL_PROBABILITY;
    }
    let clamped = probability.clamp(0.0, 1.0);
    if clamped != probability {
        warn!(table = %table, probability, "null probability outside [0, 1]; clamping");
    }
    clamped
}
