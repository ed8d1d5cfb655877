//! Data source adapters: remote price providers and the static table.

pub mod provider;
pub mod synthetic;
pub mod table;
pub mod universe;
pub mod yahoo;

pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticProvider;
pub use table::StaticTable;
pub use universe::StockUniverse;
pub use yahoo::YahooProvider;
