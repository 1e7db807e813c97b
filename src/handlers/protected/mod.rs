// handlers/protected/mod.rs - Protected handlers (bearer authentication required)
//
// Every route here sits behind `firebase_auth_middleware`, which places an
// `AuthSubject` in the request extensions. Handlers stay thin: pull the
// subject, delegate to the service, map the result to a status code.

pub mod care_logs;
pub mod care_settings;
pub mod reflection_notes;
