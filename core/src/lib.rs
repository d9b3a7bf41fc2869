//! Core library for mealprint: an immutable food catalog plus the
//! aggregation engine that turns a selection of foods and ounce
//! quantities into nutrition and lifecycle-emissions totals.

pub mod catalog;
pub mod engine;
pub mod models;
