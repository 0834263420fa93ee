pub mod report;
pub mod site;
pub mod tenant;
