pub mod techversant;

pub use techversant::TechversantClient;
