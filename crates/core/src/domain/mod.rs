pub mod activity;
pub mod campaign;
pub mod contact;
pub mod sequence;
