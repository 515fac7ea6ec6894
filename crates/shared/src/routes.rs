//! Application route table the sign-up flow participates in.

pub const HOME: &str = "/home";
pub const SIGN_UP: &str = "/signup";
