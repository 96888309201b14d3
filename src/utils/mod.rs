mod helpers;

pub use helpers::{col_name_to_index, index_to_col_name, split_cell_reference};
