use std::fmt;

/// Account name and secret for one run.
///
/// Never written anywhere; `AuthSession::authenticate` takes it by value and
/// drops it when the handshake ends.
#[derive(Clone)]
pub struct Credentials {
    account_name: String,
    secret: String,
}

impl Credentials {
    pub fn new(account_name: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            secret: secret.into(),
        }
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_name", &self.account_name)
            .field("secret", &"<redacted>")
            .finish()
    }
}
