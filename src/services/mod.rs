//! Domain services used by the HTTP routes and the navigation guard.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the decisions (guard policy, token inspection) and the
//! outside contacts (remote auth API, toast delivery) so route handlers stay
//! focused on cookie plumbing and response shaping.

pub mod guard;
pub mod notify;
pub mod session;
pub mod token;
pub mod upstream;
