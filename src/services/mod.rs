pub mod account_service;
pub mod application_service;
pub mod authorization;
pub mod csv_export;
pub mod sheets_export;
pub mod user_service;
pub mod validation;

pub use account_service::*;
pub use application_service::*;
pub use authorization::*;
pub use csv_export::*;
pub use sheets_export::*;
pub use user_service::*;
pub use validation::*;
