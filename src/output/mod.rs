pub mod formatter;

pub use formatter::{
    format_chart, format_error, format_headline, format_json, format_points, format_report,
    format_sector_table, format_sparkline, format_tsv, should_use_colors, UNKNOWN_SECTOR,
};
