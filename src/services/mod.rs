pub mod csv_import;
pub mod evaluation;
pub mod images;
pub mod llm_provider;
pub mod topics;
pub mod word_status;
pub mod word_strings;
