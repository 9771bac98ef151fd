//! Common test utilities for integration tests.

#![allow(dead_code)]

use prep_core::action::Action;
use prep_core::row::{Column, Row, Schema};
use prep_executor::writer::{CollectingWriter, WrittenHandle};
use prep_executor::{ExecutionSummary, Pipeline};

/// Schema whose column ids equal their names.
pub fn named_schema(names: &[&str]) -> Schema {
    names.iter().map(|name| Column::new(*name, *name)).collect()
}

/// Schema with generated ids `0000`, `0001`, ...
pub fn indexed_schema(names: &[&str]) -> Schema {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(format!("{i:04}"), *name))
        .collect()
}

/// Row `id` holding `values` in schema order.
pub fn row(schema: &Schema, id: u64, values: &[&str]) -> Row {
    schema
        .ids()
        .zip(values)
        .fold(Row::new(schema.clone()).with_id(id), |row, (column, value)| {
            row.with_value(column.clone(), *value)
        })
}

/// Rows numbered from 1.
pub fn rows(schema: &Schema, values: &[&[&str]]) -> Vec<Row> {
    values
        .iter()
        .zip(1..)
        .map(|(values, id)| row(schema, id, values))
        .collect()
}

/// `name` with the given parameters.
pub fn action(name: &str, parameters: &[(&str, &str)]) -> Action {
    parameters
        .iter()
        .fold(Action::new(name), |action, (key, value)| action.with_parameter(*key, *value))
}

/// Run `actions` through the standard registry into a collecting writer.
pub fn run(schema: &Schema, actions: Vec<Action>, input: Vec<Row>) -> (ExecutionSummary, WrittenHandle) {
    let (writer, written) = CollectingWriter::new();
    let summary = Pipeline::builder()
        .schema(schema.clone())
        .registry(prep_actions::standard_registry())
        .actions(actions)
        .writer(writer)
        .build()
        .unwrap()
        .execute(input)
        .unwrap();
    (summary, written)
}

/// Values of a row, in the order of its own schema.
pub fn values(row: &Row) -> Vec<&str> {
    row.ordered_values()
}

/// Column names of a schema.
pub fn names(schema: &Schema) -> Vec<&str> {
    schema.columns().iter().map(|c| c.name.as_str()).collect()
}
