pub mod catalogdb;
pub mod comparisondb;
pub mod db;
