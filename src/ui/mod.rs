pub mod components;
pub mod dashboard;
pub mod login;
pub mod payment_wizard;
pub mod payments;
pub mod project_wizard;
pub mod projects;
