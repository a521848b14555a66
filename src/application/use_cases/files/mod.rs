pub mod get_file_usage;
