pub mod classify;
pub mod export;
pub mod parser;
pub mod quality;
pub mod stats;
pub mod types;
pub mod viz;

pub use classify::classify_columns;
pub use export::{export_table, paginate};
pub use parser::{parse_csv, parse_json, SourceFormat};
pub use quality::assess_quality;
pub use types::{Cell, Table};
