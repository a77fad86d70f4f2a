//! Network layer: UDP transport in front of the game service.

mod server;

pub use server::Server;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
}
