use thiserror::Error;

/// The graph could not be loaded at all.
#[derive(Debug, Error)]
pub enum LoadError {
	/// None of the collections held a record.
	#[error("all data collections are empty or missing")]
	NoRecords,
	/// Records were present but none became a node.
	#[error("no graph nodes could be built from the data")]
	NoNodes,
	/// A bundled collection is not valid JSON.
	#[error("failed to parse {collection} data: {source}")]
	Json {
		/// Which collection failed.
		collection: &'static str,
		/// The parser's error.
		#[source]
		source: serde_json::Error,
	},
}

/// A time range the filter refuses to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RangeError {
	/// The start is not before the end.
	#[error("start year {start} must be earlier than end year {end}")]
	Inverted {
		/// Requested first year.
		start: i32,
		/// Requested last year.
		end: i32,
	},
	/// A bound lies outside the years the controls offer.
	#[error("year {year} is outside the supported span {min}..={max}")]
	OutOfBounds {
		/// The offending bound.
		year: i32,
		/// Earliest allowed year.
		min: i32,
		/// Latest allowed year.
		max: i32,
	},
}
