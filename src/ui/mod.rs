pub mod icons;
pub mod output;
pub mod progress;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{header, info, pending_url, success, summary_row, warn};
pub use progress::Spinner;
pub use table::{TableBuilder, stats_table, url_table};
pub use theme::{theme, Theme};
