pub mod postgres;

pub use postgres::RelationalStore;
