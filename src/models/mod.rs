mod chart;
mod combined_table;
mod field;
mod selection;
mod symbol;
mod ticker_record;

pub use chart::{ChartSpec, Legend, LineSeries};
pub use combined_table::CombinedTable;
pub use field::Field;
pub use selection::SelectionState;
pub use symbol::Symbol;
pub use ticker_record::TickerRecord;
