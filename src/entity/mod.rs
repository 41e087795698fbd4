pub mod blockdev;
pub mod report;
pub mod tags;
pub mod volume;
