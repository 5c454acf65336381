pub mod health;
pub mod modules;
pub mod pages;
pub mod session;
