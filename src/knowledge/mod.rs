//! Historical records, their dates, and the graph built from them.

/// Turns the three record collections into nodes and edges.
pub mod builder;
pub mod chronology;
/// The bundled dataset and collection loading.
pub mod dataset;
/// Load and time-range errors.
pub mod error;
/// Time-range and search filtering of a built graph.
pub mod filter;
pub mod normalize;
pub mod numerals;
/// Raw input records and collection coercion.
pub mod record;
mod types;

pub use builder::{build, build_from_json};
pub use chronology::{Dynasty, Reign, format_year};
pub use error::{LoadError, RangeError};
pub use filter::{TimeRange, filter};
pub use normalize::{TimeInterval, normalize};
pub use record::Record;
pub use types::{EdgeKind, GraphData, GraphEdge, GraphNode, NodeKind};
