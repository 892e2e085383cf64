pub mod message;
pub mod model;
pub mod send;

pub use message::Message;
pub use model::Transaction;
pub use send::send_virtual_coins;
