//! Business services
//!
//! Each service holds the injected [`Repositories`](crate::db::Repositories)
//! and applies validation and domain rules before touching the store.

pub mod customer;
pub mod customer_category;
pub mod loyalty;
pub mod people;
pub mod presentation;
pub mod reward;

pub use customer::{CustomerService, ReconciliationError};
pub use customer_category::CustomerCategoryService;
pub use loyalty::LoyaltyService;
pub use people::PeopleService;
pub use presentation::PresentationService;
pub use reward::RewardService;
