pub mod file_dialog;
pub mod previews;
pub mod rendered;
pub mod window;
