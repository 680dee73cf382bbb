pub mod pages;
pub mod predict;
pub mod respond;
pub mod site;

pub use predict::{predict, predict_page};
pub use respond::ResponseMode;
pub use site::{health_check, home};
