pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod pool;
pub mod shutdown;
pub mod worker;
