pub mod events;
pub mod instances;
pub mod status;
