pub mod db;
mod models;

pub mod prelude;
