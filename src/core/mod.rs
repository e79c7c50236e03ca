pub mod book_manager;
pub mod matching;
pub mod services;
pub mod totals;

pub use book_manager::BookManager;
