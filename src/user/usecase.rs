//! Sign-up and sign-in.

use std::sync::{Arc, LazyLock};

use regex_lite::Regex;
use validator::{Validate, ValidationError};

use crate::crypto::PasswordManager;
use crate::error::{ApplicationError, RepositoryError, ToInternal};
use crate::token::TokenManager;
use crate::user::{User, UserRepository};

type Result<T> = std::result::Result<T, ApplicationError>;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap()
});

fn validate_email(email: &str) -> std::result::Result<(), ValidationError> {
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::new("email"));
    }

    Ok(())
}

/// Passwords need at least one ASCII letter and one digit.
fn validate_password(password: &str) -> std::result::Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_letter || !has_digit {
        return Err(ValidationError::new("password"));
    }

    Ok(())
}

/// Access token returned after authentication.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
}

/// Input of [`SignUp`].
#[derive(Clone, Debug, Validate)]
pub struct SignUpParams {
    #[validate(length(min = 1, max = 255, message = "name is invalid"))]
    pub name: String,
    #[validate(
        length(min = 1, max = 255, message = "email is invalid"),
        custom(function = "validate_email", message = "email is invalid")
    )]
    pub email: String,
    #[validate(
        length(min = 8, message = "password is invalid"),
        custom(function = "validate_password", message = "password is invalid")
    )]
    pub password: String,
}

/// Register a new user.
pub struct SignUp {
    users: Arc<dyn UserRepository>,
    crypto: Arc<PasswordManager>,
    token: TokenManager,
}

impl SignUp {
    pub fn new(
        users: Arc<dyn UserRepository>,
        crypto: Arc<PasswordManager>,
        token: TokenManager,
    ) -> Self {
        Self {
            users,
            crypto,
            token,
        }
    }

    pub async fn execute(&self, params: SignUpParams) -> Result<AccessToken> {
        params.validate()?;

        match self.users.find_by_email(&params.email).await {
            Ok(_) => return Err(ApplicationError::EmailExists),
            Err(RepositoryError::NotFound) => {},
            Err(err) => return Err(err.into()),
        }

        let password = self.crypto.hash_password(&params.password).catch()?;
        let mut user = User::new(params.name, params.email, password);

        match self.users.create(&mut user).await {
            Ok(()) => {},
            Err(RepositoryError::UniqueViolation(_)) => {
                return Err(ApplicationError::EmailExists);
            },
            Err(err) => return Err(err.into()),
        }

        tracing::info!(user_id = user.id, "user signed up");

        Ok(AccessToken {
            access_token: self.token.create(user.id).catch()?,
        })
    }
}

/// Input of [`SignIn`].
#[derive(Clone, Debug, Validate)]
pub struct SignInParams {
    #[validate(
        length(min = 1, max = 255, message = "email is invalid"),
        custom(function = "validate_email", message = "email is invalid")
    )]
    pub email: String,
    #[validate(length(min = 8, message = "password is invalid"))]
    pub password: String,
}

/// Authenticate a user with email and password.
pub struct SignIn {
    users: Arc<dyn UserRepository>,
    crypto: Arc<PasswordManager>,
    token: TokenManager,
}

impl SignIn {
    pub fn new(
        users: Arc<dyn UserRepository>,
        crypto: Arc<PasswordManager>,
        token: TokenManager,
    ) -> Self {
        Self {
            users,
            crypto,
            token,
        }
    }

    pub async fn execute(&self, params: SignInParams) -> Result<AccessToken> {
        params.validate()?;

        let user = match self.users.find_by_email(&params.email).await {
            Ok(user) => user,
            Err(RepositoryError::NotFound) => {
                tracing::debug!("sign-in with unknown email");
                return Err(ApplicationError::InvalidCredentials);
            },
            Err(err) => return Err(err.into()),
        };

        if !self
            .crypto
            .verify_password(&params.password, &user.password)
            .catch()?
        {
            tracing::debug!(user_id = user.id, "sign-in with wrong password");
            return Err(ApplicationError::InvalidCredentials);
        }

        Ok(AccessToken {
            access_token: self.token.create(user.id).catch()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::tests::password_manager;
    use crate::user::MemoryUserRepository;

    struct Context {
        users: Arc<dyn UserRepository>,
        crypto: Arc<PasswordManager>,
        token: TokenManager,
    }

    impl Context {
        fn new() -> Self {
            Self {
                users: Arc::new(MemoryUserRepository::new()),
                crypto: Arc::new(password_manager()),
                token: TokenManager::new("secret").unwrap(),
            }
        }

        fn sign_up(&self) -> SignUp {
            SignUp::new(
                Arc::clone(&self.users),
                Arc::clone(&self.crypto),
                self.token.clone(),
            )
        }

        fn sign_in(&self) -> SignIn {
            SignIn::new(
                Arc::clone(&self.users),
                Arc::clone(&self.crypto),
                self.token.clone(),
            )
        }
    }

    fn sign_up_params(password: &str) -> SignUpParams {
        SignUpParams {
            name: "John Doe".into(),
            email: "john@example.com".into(),
            password: password.into(),
        }
    }

    fn sign_in_params(password: &str) -> SignInParams {
        SignInParams {
            email: "john@example.com".into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_sign_up() {
        let ctx = Context::new();

        let result = ctx
            .sign_up()
            .execute(sign_up_params("password123"))
            .await
            .unwrap();
        let claims = ctx.token.decode(&result.access_token).unwrap();

        let user = ctx.users.find_by_email("john@example.com").await.unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_ne!(user.password, "password123");
        assert!(user.password.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_sign_up_weak_password() {
        let ctx = Context::new();

        for password in ["12345678", "password", "pass1"] {
            let err = ctx
                .sign_up()
                .execute(sign_up_params(password))
                .await
                .unwrap_err();
            assert!(
                matches!(&err, ApplicationError::InvalidParams(reason) if reason == "password is invalid"),
                "{password}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_sign_up_invalid_email() {
        let ctx = Context::new();

        let mut params = sign_up_params("password123");
        params.email = "john@example".into();
        assert!(matches!(
            ctx.sign_up().execute(params).await,
            Err(ApplicationError::InvalidParams(reason)) if reason == "email is invalid"
        ));
    }

    #[tokio::test]
    async fn test_sign_up_existing_email() {
        let ctx = Context::new();

        ctx.sign_up()
            .execute(sign_up_params("password123"))
            .await
            .unwrap();
        assert!(matches!(
            ctx.sign_up().execute(sign_up_params("password456")).await,
            Err(ApplicationError::EmailExists)
        ));
    }

    #[tokio::test]
    async fn test_sign_in() {
        let ctx = Context::new();
        ctx.sign_up()
            .execute(sign_up_params("password123"))
            .await
            .unwrap();

        let result = ctx
            .sign_in()
            .execute(sign_in_params("password123"))
            .await
            .unwrap();
        assert_eq!(ctx.token.decode(&result.access_token).unwrap().user_id, 1);

        assert!(matches!(
            ctx.sign_in().execute(sign_in_params("password456")).await,
            Err(ApplicationError::InvalidCredentials)
        ));

        let mut unknown = sign_in_params("password123");
        unknown.email = "jane@example.com".into();
        assert!(matches!(
            ctx.sign_in().execute(unknown).await,
            Err(ApplicationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_sign_in_short_password() {
        let ctx = Context::new();

        assert!(matches!(
            ctx.sign_in().execute(sign_in_params("short")).await,
            Err(ApplicationError::InvalidParams(_))
        ));
    }
}
