// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service descriptor and liveness probe. Mounted outside the bearer
// middleware so load balancers can reach them anonymously.

pub mod health;
pub mod root;

pub use health::health;
pub use root::root;
