//! Analysis engine: type classification, aggregation and query derivation
//! on top of the annotation pipeline.

mod aggregator;
mod classifier;
mod query;
mod service;

pub use aggregator::{keep_linked, ResultAggregator, LINKED_SOURCE, NER_SOURCE};
pub use classifier::{TypeClassifier, TypeRule};
pub use query::{escape_query_chars, join_clauses, or_clause};
pub use service::{error_response, AnalysisService};
