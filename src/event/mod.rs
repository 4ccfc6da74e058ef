pub mod stonks;
