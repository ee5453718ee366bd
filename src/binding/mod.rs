//! # Binding Module
//!
//! Turns a matched route plus a parsed request into typed parameter values,
//! or into a [`ValidationError`](crate::validator::ValidationError) that lists
//! every failing field.
//!
//! ## Overview
//!
//! At registration, [`classify_parameter`] fixes each declared parameter's
//! origin:
//!
//! 1. a name that appears as a template placeholder is a **path** parameter;
//! 2. otherwise an explicit `in` annotation wins;
//! 3. otherwise models, lists and dicts come from the **body**;
//! 4. everything else comes from the **query** string.
//!
//! and [`body_layout`] decides whether a lone body parameter receives the whole
//! JSON body or the body is an object keyed by parameter name.
//!
//! Per request, [`bind`] reads every parameter from its origin, applies the
//! presence rule (required, default or `null`), coerces the raw value in lax
//! mode and then checks constraints. Failures are collected, never
//! short-circuited:
//!
//! ```text
//! GET /items/abc?q=x&limit=-1
//!   path.item_id   int_parsing         "abc"
//!   query.limit    greater_than_equal  "-1"
//! ```

mod bind;
mod classify;
mod coerce;
mod constraints;
pub mod temporal;
#[cfg(test)]
mod tests;

pub use bind::{bind, BoundRequest};
pub use classify::{body_layout, classify_parameter};
pub use coerce::{coerce_default, parse_lax_bool};
