pub mod users;

pub use users::{
    create_user, find_user_by_email, init_db, is_duplicate_email, NewUser, UserRecord,
};
