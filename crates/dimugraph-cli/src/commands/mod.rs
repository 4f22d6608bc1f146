pub mod build;
pub mod compare;
pub mod sweep;
pub mod train;
