pub mod file_list;
