mod common;
mod proposals;
mod requests;
