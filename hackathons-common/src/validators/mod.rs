pub const MAX_EMAIL_LENGTH: usize = 254;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 100;

pub const MIN_CITY_LENGTH: usize = 2;
pub const MAX_CITY_LENGTH: usize = 50;

pub const INVALID_EMAIL_MSG: &str = "Invalid email format";
pub const INVALID_NAME_MSG: &str = "Name must be between 2 and 100 characters";
pub const INVALID_CITY_MSG: &str = "City must be between 2 and 50 characters";
pub const INVALID_NOTIFICATIONS_MSG: &str = "Invalid notifications preferences";

#[derive(Debug, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(&'static str),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        match &self {
            Validity::Valid => true,
            Validity::Invalid(_) => false,
        }
    }
}

/// Accepts `local@domain.tld` where the local part is made of `[A-Za-z0-9._%+-]`, the domain
/// of `[A-Za-z0-9.-]`, and the TLD after the final period is at least two ASCII letters.
pub fn validate_email(email: &str) -> Validity {
    if email.len() > MAX_EMAIL_LENGTH {
        return Validity::Invalid(INVALID_EMAIL_MSG);
    }

    let Some((local_part, domain)) = email.split_once('@') else {
        return Validity::Invalid(INVALID_EMAIL_MSG);
    };

    if local_part.is_empty() || !local_part.chars().all(is_local_part_char) {
        return Validity::Invalid(INVALID_EMAIL_MSG);
    }

    // Neither side may contain another '@', so a second one fails the character checks
    let Some((domain_name, tld)) = domain.rsplit_once('.') else {
        return Validity::Invalid(INVALID_EMAIL_MSG);
    };

    if domain_name.is_empty() || !domain_name.chars().all(is_domain_char) {
        return Validity::Invalid(INVALID_EMAIL_MSG);
    }

    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Validity::Invalid(INVALID_EMAIL_MSG);
    }

    Validity::Valid
}

pub fn validate_name(name: &str) -> Validity {
    if is_within_bounds(name, MIN_NAME_LENGTH, MAX_NAME_LENGTH) {
        Validity::Valid
    } else {
        Validity::Invalid(INVALID_NAME_MSG)
    }
}

pub fn validate_city(city: &str) -> Validity {
    if is_within_bounds(city, MIN_CITY_LENGTH, MAX_CITY_LENGTH) {
        Validity::Valid
    } else {
        Validity::Invalid(INVALID_CITY_MSG)
    }
}

/// Trims outer whitespace and strips `<` and `>`. This is a minimal filter for the two
/// characters that open and close markup; it does not make a string safe for any other
/// context.
pub fn sanitize_input(input: &str) -> String {
    input.trim().chars().filter(|c| *c != '<' && *c != '>').collect()
}

/// Lengths are measured in UTF-16 code units, the unit web clients count in, so a character
/// outside the Basic Multilingual Plane counts twice.
#[inline]
fn is_within_bounds(value: &str, min_len: usize, max_len: usize) -> bool {
    let len = value.encode_utf16().count();
    !value.trim().is_empty() && len >= min_len && len <= max_len
}

#[inline]
fn is_local_part_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-')
}

#[inline]
fn is_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-')
}
