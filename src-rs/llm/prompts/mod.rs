pub mod file_selection;
