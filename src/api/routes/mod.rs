pub mod ask;
pub mod scout;
pub mod teams;
