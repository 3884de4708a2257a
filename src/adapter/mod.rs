pub mod appstore;
