//! HTTP boundary: request/response bodies, error mapping, admin guard and the router.

pub mod auth;
pub mod error;
pub mod payloads;
pub mod router;
pub mod service;

pub use auth::AdminGuard;
pub use error::ApiError;
pub use router::cost_router;
pub use service::CostCalculatorService;
