mod classification_chart;
mod rankings_table;
mod series_table;
mod summary_cards;

pub use classification_chart::classification_chart;
pub use rankings_table::rankings_table;
pub use series_table::series_table;
pub use summary_cards::summary_cards;
