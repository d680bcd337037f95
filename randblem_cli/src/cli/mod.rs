mod auth;
mod callback;
mod common;
mod prefs;
mod profile;
mod root;
mod run;

pub(crate) use root::get_args;
