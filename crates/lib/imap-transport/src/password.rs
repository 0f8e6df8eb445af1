/// A login password that never shows up in debug output.
#[derive(Clone, Eq, PartialEq)]
pub struct Password(String);

impl Password {
    /// The password text, for the login command.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for Password {
    fn from(value: T) -> Self {
        Self(value.into())
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}
