pub mod functions;
pub mod scans;
