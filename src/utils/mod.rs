pub mod cookies;
pub mod redirect;
pub mod responses;
