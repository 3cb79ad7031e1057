mod health;
mod index;
mod link;

pub use health::health_handler;
pub use index::{favicon_handler, index_handler};
pub use link::{
    create_generated_handler, create_requested_handler, delete_link_handler, redirect_handler,
};
