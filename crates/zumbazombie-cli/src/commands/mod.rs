pub mod activities;
pub mod config;
pub mod run;
pub mod simulate;
