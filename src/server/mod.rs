pub use channel::SMBChannel;
pub use connection::SMBConnection;
pub use preauth_session::SMBPreauthSession;
pub use session::{SMBSession, SessionKey};

mod channel;
mod connection;
mod preauth_session;
mod session;
