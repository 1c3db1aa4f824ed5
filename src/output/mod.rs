pub mod formatter;
pub mod storage;

pub use formatter::{
    format_age, format_catalog, format_category_tsv, format_parameter_detail,
    format_ranked_table, format_report, format_score, format_tsv, should_use_colors,
};
pub use storage::{format_json, format_json_list, save_report};
