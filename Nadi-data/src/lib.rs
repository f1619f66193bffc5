// NADI Data
// This crate holds the storage side of the analysis service: the last computed
// result and the usage counters. Nothing here outlives the process.

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
