pub mod config;
pub mod logger;
pub mod server;
pub mod post;
pub mod category;
pub mod text_utils;
pub mod query_string;
pub mod router;
pub mod store;
pub mod view;
pub mod controller;
pub mod form;
pub mod dispatch;
#[cfg(test)]
mod test_data;
