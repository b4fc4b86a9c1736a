pub mod data;

pub use data::{build_index_dir, load_index, save_index};
