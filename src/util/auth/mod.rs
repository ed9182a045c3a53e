pub use user::User;

pub mod gss;
pub mod ntlm;
mod user;

/// Read-only lookup into the external account database.
pub trait CredentialStore: Send + Sync {
    fn lookup_user(&self, username: &str) -> Option<&User>;
}

impl CredentialStore for Vec<User> {
    fn lookup_user(&self, username: &str) -> Option<&User> {
        self.iter().find(|user| user.username == username)
    }
}
