pub mod capture;
pub mod doctor;
pub mod plan;
pub mod restore;
pub mod script;
