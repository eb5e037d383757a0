pub mod editor;
pub mod file_ops;
