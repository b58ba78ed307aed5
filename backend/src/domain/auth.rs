//! Authentication primitives: signup and login credentials.
//!
//! Inbound adapters build these from raw request strings before talking to
//! the account service, so the service only ever sees validated inputs.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::{EmailAddress, UserProfile, UserValidationError, Username};

/// Minimum accepted password length at signup.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// A profile or username field failed validation.
    User(UserValidationError),
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::User(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        match value {
            UserValidationError::InvalidEmail => Self::InvalidEmail,
            other => Self::User(other),
        }
    }
}

/// Validated login credentials.
///
/// The password keeps caller-provided whitespace and is zeroed on drop.
///
/// # Examples
/// ```
/// use grocer::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Example.com", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw signup fields as received from a client.
#[derive(Debug, Clone, Copy)]
pub struct SignupParts<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub username: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
}

/// Validated signup request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
    username: Option<Username>,
    profile: UserProfile,
}

impl SignupCredentials {
    /// Validate raw signup fields. Blank usernames are treated as absent.
    pub fn try_from_parts(parts: SignupParts<'_>) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(parts.email)?;
        if parts.password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        if parts.password.chars().count() < PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let username = parts
            .username
            .filter(|name| !name.trim().is_empty())
            .map(Username::new)
            .transpose()?;
        let profile = UserProfile::new(parts.first_name, parts.last_name, parts.avatar_url)?;
        Ok(Self {
            email,
            password: Zeroizing::new(parts.password.to_owned()),
            username,
            profile,
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn parts() -> SignupParts<'static> {
        SignupParts {
            email: "ada@example.com",
            password: "correct horse",
            first_name: "Ada",
            last_name: "Lovelace",
            username: None,
            avatar_url: None,
        }
    }

    #[rstest]
    #[case("", "pw", CredentialsValidationError::InvalidEmail)]
    #[case("nobody", "pw", CredentialsValidationError::InvalidEmail)]
    #[case("ada@example.com", "", CredentialsValidationError::EmptyPassword)]
    fn invalid_login_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", " pw ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.password(), " pw ");
    }

    #[rstest]
    fn signup_rejects_short_passwords(parts: SignupParts<'static>) {
        let err = SignupCredentials::try_from_parts(SignupParts {
            password: "12345",
            ..parts
        })
        .expect_err("short password");
        assert_eq!(
            err,
            CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN }
        );
    }

    #[rstest]
    fn signup_treats_blank_username_as_absent(parts: SignupParts<'static>) {
        let creds = SignupCredentials::try_from_parts(SignupParts {
            username: Some("   "),
            ..parts
        })
        .expect("valid signup");
        assert!(creds.username().is_none());
    }

    #[rstest]
    fn signup_requires_last_name(parts: SignupParts<'static>) {
        let err = SignupCredentials::try_from_parts(SignupParts {
            last_name: "",
            ..parts
        })
        .expect_err("missing last name");
        assert_eq!(err.to_string(), "last name is required");
    }
}
