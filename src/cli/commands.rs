pub mod initdb;
pub mod seed;
pub mod serve;

pub use initdb::init_database;
pub use seed::seed;
pub use serve::serve;
