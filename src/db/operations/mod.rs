pub mod progress;
pub mod vocabulary;
pub mod word_strings;
pub mod words;
