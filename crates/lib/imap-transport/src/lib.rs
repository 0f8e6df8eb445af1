//! IMAP implementation of the mail transport, over tokio and rustls.

mod connector;
mod error;
mod password;
mod session;
mod tls;

pub use self::connector::*;
pub use self::error::*;
pub use self::password::*;
pub use self::session::*;
pub use self::tls::*;
