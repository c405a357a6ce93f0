// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation and login: the two endpoints that hand out session
// tokens to anonymous callers.
pub mod users;
