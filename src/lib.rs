//! Resolver for the UEFISCDI journal ranking databases.
//!
//! The core turns heterogeneous extracted rows of the JIF/AIS/RIS/RIF
//! editions into canonical [`index::ScoreRecord`]s, merges per-category
//! duplicates under a rank-precedence policy and resolves queries by ISSN
//! or by normalized journal name. Around it sit the edition registry, a
//! download client and an on-disk cache of built stores.

pub mod adapt;
pub mod app;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod index;
pub mod normalize;
pub mod output;
pub mod registry;
pub mod rows;
pub mod store;
