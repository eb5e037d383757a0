pub mod entry;
pub mod history;
pub mod navigator;
pub mod register;
pub mod selection;
