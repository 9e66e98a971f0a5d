pub mod extract;
pub mod llm;
pub mod output;
pub mod scan;
pub mod scrape;
pub mod server;
pub mod tokenize;
