pub mod master;
pub mod status;
