use core::fmt;

pub const MIN_LEN: usize = 3;
pub const MAX_LEN: usize = 20;

/// Case-insensitive substring blocklist; any hit rejects the whole username.
const RESTRICTED_WORDS: [&str; 4] = ["admin", "moderator", "system", "official"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsernameError {
    Empty,
    BadLength { len: usize },
    InvalidCharacters,
    RestrictedWord { word: &'static str },
}

impl fmt::Display for UsernameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Username is required"),
            Self::BadLength { .. } => {
                write!(f, "Username must be {MIN_LEN}-{MAX_LEN} characters")
            }
            Self::InvalidCharacters => write!(
                f,
                "Username can only contain letters, numbers, and underscores"
            ),
            Self::RestrictedWord { .. } => write!(f, "Username contains restricted words"),
        }
    }
}

impl std::error::Error for UsernameError {}

/// Validate a candidate username. Rules apply in order; first failure wins.
pub fn validate_username(username: &str) -> Result<(), UsernameError> {
    if username.is_empty() {
        return Err(UsernameError::Empty);
    }

    let len = username.chars().count();
    if !(MIN_LEN..=MAX_LEN).contains(&len) {
        return Err(UsernameError::BadLength { len });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(UsernameError::InvalidCharacters);
    }

    let lowered = username.to_ascii_lowercase();
    for word in RESTRICTED_WORDS {
        if lowered.contains(word) {
            return Err(UsernameError::RestrictedWord { word });
        }
    }

    Ok(())
}
