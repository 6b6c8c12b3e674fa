pub mod tasks;
pub mod uploads;
