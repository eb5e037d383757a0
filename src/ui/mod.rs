pub mod app;
pub mod dialogs;
pub mod draw;
pub mod panel;
pub mod preview;
pub mod theme;
