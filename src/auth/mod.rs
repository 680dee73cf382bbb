pub mod flash;
pub mod handlers;
pub mod password;
pub mod session;

pub use flash::Flash;
pub use handlers::{login, login_page, logout, register, register_page};
pub use session::{
    UserIdentity, create_session, destroy_session, require_session, session_guard, signing_key,
};
