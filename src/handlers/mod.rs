// handlers/mod.rs - two handler tiers
//
// Public (no auth): `/`, `/health`
// Protected (bearer auth): `/api/*`

pub mod protected;
pub mod public;
