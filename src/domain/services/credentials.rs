use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use crate::domain::models::principal::{NewPrincipalParams, Principal, PrincipalKeys, Role};
use crate::error::AppError;

/// How a login identifier is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier<'a> {
    Email(&'a str),
    Phone(&'a str),
    Username(&'a str),
}

impl<'a> Identifier<'a> {
    /// `@` means email, exactly ten ASCII digits mean phone, anything else is a username.
    pub fn classify(raw: &'a str) -> Self {
        if raw.contains('@') {
            Identifier::Email(raw)
        } else if raw.len() == 10 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Identifier::Phone(raw)
        } else {
            Identifier::Username(raw)
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHash::new(password_hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

/// Lowercases the domain part, leaving the local part as given.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && !domain.contains('@'),
        None => false,
    };
    if !valid {
        return Err(AppError::invalid("email", "Enter a valid email address."));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    if username.is_empty() || username.len() > 150 {
        return Err(AppError::invalid("username", "Username must be between 1 and 150 characters."));
    }
    if !username.chars().all(|c| c.is_alphanumeric() || ".+-_".contains(c)) {
        return Err(AppError::invalid("username", "Enter a valid username. Letters, digits and ./+/-/_ only."));
    }
    // Login would route this shape to the phone lookup.
    if matches!(Identifier::classify(username), Identifier::Phone(_)) {
        return Err(AppError::invalid("username", "Username cannot be a 10-digit number."));
    }
    Ok(())
}

/// Empty phone numbers are stored as absent.
pub fn normalize_phone(phone: Option<String>) -> Result<Option<String>, AppError> {
    let Some(phone) = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    if phone.len() > 15 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::invalid("phone_number", "Phone number must contain only digits."));
    }
    Ok(Some(phone))
}

pub fn validate_password(password: &str, confirmation: &str) -> Result<(), AppError> {
    if password != confirmation {
        return Err(AppError::invalid("password", "Passwords must match"));
    }
    if password.len() < 8 {
        return Err(AppError::invalid("password", "This password is too short. It must contain at least 8 characters."));
    }
    Ok(())
}

/// Field-level conflict for the first unique key `candidate` shares with a stored principal.
pub fn ensure_unique(candidate: &Principal, existing: &[PrincipalKeys]) -> Result<(), AppError> {
    for keys in existing {
        if let Some(field) = candidate.collides_with(keys) {
            let label = if field == "phone_number" { "phone number" } else { field };
            return Err(AppError::DuplicateField {
                field,
                message: format!("A user with this {label} already exists."),
            });
        }
    }
    Ok(())
}

/// Raw account fields as submitted by a caller.
pub struct AccountInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Validates and normalizes `input`, hashing the password into a new principal.
/// Password confirmation is the caller's concern.
pub fn prepare_principal(input: AccountInput, role: Role) -> Result<Principal, AppError> {
    let username = input.username.trim().to_string();
    validate_username(&username)?;
    let email = normalize_email(&input.email);
    validate_email(&email)?;
    let phone_number = normalize_phone(input.phone_number)?;
    validate_password(&input.password, &input.password)?;

    Ok(Principal::new(NewPrincipalParams {
        email,
        username,
        phone_number,
        first_name: input.first_name.trim().to_string(),
        last_name: input.last_name.trim().to_string(),
        password_hash: hash_password(&input.password)?,
        role,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_classified_by_shape() {
        assert_eq!(Identifier::classify("a@b.com"), Identifier::Email("a@b.com"));
        assert_eq!(Identifier::classify("0712345678"), Identifier::Phone("0712345678"));
        assert_eq!(Identifier::classify("071234567"), Identifier::Username("071234567"));
        assert_eq!(Identifier::classify("notaphone"), Identifier::Username("notaphone"));
        assert_eq!(Identifier::classify("07123456789"), Identifier::Username("07123456789"));
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-phc-string"));
    }

    #[test]
    fn email_domain_is_lowercased() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "Alice@example.com");
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("alice.example.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn phone_is_optional_but_numeric() {
        assert_eq!(normalize_phone(None).unwrap(), None);
        assert_eq!(normalize_phone(Some("  ".into())).unwrap(), None);
        assert_eq!(normalize_phone(Some("0712345678".into())).unwrap(), Some("0712345678".into()));
        assert!(normalize_phone(Some("07-1234".into())).is_err());
    }

    #[test]
    fn passwords_must_match() {
        assert!(validate_password("s3cretpass", "s3cretpass").is_ok());
        assert!(matches!(
            validate_password("s3cretpass", "other"),
            Err(AppError::InvalidField { field: "password", .. })
        ));
        assert!(validate_password("short", "short").is_err());
    }

    #[test]
    fn prepared_principal_is_normalized() {
        let principal = prepare_principal(
            AccountInput {
                username: " jane ".into(),
                email: "Jane@Example.COM".into(),
                password: "longenough".into(),
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                phone_number: Some("".into()),
            },
            Role::Tenant,
        ).unwrap();

        assert_eq!(principal.username, "jane");
        assert_eq!(principal.email, "Jane@example.com");
        assert_eq!(principal.phone_number, None);
        assert!(verify_password("longenough", &principal.password_hash));
    }

    #[test]
    fn usernames_stay_reachable_by_login() {
        assert!(validate_username("jane.doe-2").is_ok());
        assert!(validate_username("071234567").is_ok());
        for unreachable in ["jane@home", "0712345678"] {
            let err = validate_username(unreachable).unwrap_err();
            assert!(matches!(err, AppError::InvalidField { field: "username", .. }), "{unreachable}");
            assert!(!matches!(Identifier::classify(unreachable), Identifier::Username(_)));
        }
    }
}
