pub mod catalogmodels;
pub mod comparisonmodels;
pub mod usermodel;
