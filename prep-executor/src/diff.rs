//! Row-level differences between two versions of a preparation.

use crate::executor::Executor;
use prep_core::action::{Action, ActionRegistry};
use prep_core::error::Result;
use prep_core::row::{Row, RowDiff, Schema};
use std::collections::HashMap;

/// Pair rows by row id and compare each new row with its old version.
///
/// New rows without a counterpart are compared against a deleted empty
/// row, so they come out flagged `NEW`. Rows without an id are paired by
/// position.
pub fn preview_diff(old_rows: &[Row], new_rows: &[Row]) -> Vec<RowDiff> {
    let by_id: HashMap<u64, &Row> = old_rows
        .iter()
        .filter_map(|row| row.id().map(|id| (id, row)))
        .collect();

    new_rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let old = match row.id() {
                Some(id) => by_id.get(&id).copied(),
                None => old_rows.get(index),
            };
            match old {
                Some(old) => row.diff(old),
                None => {
                    let mut absent = Row::new(row.schema().clone());
                    absent.set_deleted(true);
                    row.diff(&absent)
                }
            }
        })
        .collect()
}

/// Run `rows` through two action lists and compare the outputs.
pub fn preview(
    registry: &ActionRegistry,
    schema: &Schema,
    rows: &[Row],
    old_actions: &[Action],
    new_actions: &[Action],
) -> Result<Vec<RowDiff>> {
    let old_rows = run(registry, schema, rows, old_actions)?;
    let new_rows = run(registry, schema, rows, new_actions)?;
    Ok(preview_diff(&old_rows, &new_rows))
}

fn run(registry: &ActionRegistry, schema: &Schema, rows: &[Row], actions: &[Action]) -> Result<Vec<Row>> {
    let mut executor = Executor::new(registry.resolve(actions)?);
    let out = executor.execute_all(rows.iter().cloned().map(|mut row| {
        row.set_schema(schema.clone());
        row
    }))?;
    executor.finish();
    Ok(out)
}
