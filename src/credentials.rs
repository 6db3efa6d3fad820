//! Random mailbox credentials for account creation.
//!
//! Best-effort uniqueness only. The password is whatever the RNG gives us;
//! nothing here is a security boundary.

use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

const PASSWORD_LEN: usize = 16;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Beatrice", "Carlos", "Chioma", "Dmitri", "Elena", "Farah", "Grace", "Hiro",
    "Ingrid", "Jamal", "Katarina", "Liam", "Mei", "Nadia", "Oscar", "Priya", "Quinn", "Rosa",
    "Sven", "Tomás", "Uma", "Viktor", "Wanjiru", "Yusuf", "Zoë",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Bergström", "Castillo", "D'Amico", "Eze", "Fischer", "García", "Hoffmann",
    "Ivanova", "Jensen", "Kowalski", "Lindqvist", "Moreau", "Nakamura", "O'Brien", "Petrov",
    "Rossi", "Schmidt", "Tanaka", "Van der Berg", "Walsh", "Yilmaz", "Zhang",
];

const SEPARATORS: &[&str] = &["", ".", "_", "-"];

/// A generated address/password pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub address: String,
    pub password: String,
}

/// Generate credentials on `domain` using the thread-local RNG.
pub fn generate_credentials(domain: &str) -> Credentials {
    generate_credentials_with(&mut rand::thread_rng(), domain)
}

/// Generate credentials on `domain` from the given RNG.
pub fn generate_credentials_with<R: Rng + ?Sized>(rng: &mut R, domain: &str) -> Credentials {
    let mut local = sanitize_local_part(&random_username(rng));
    if local.is_empty() {
        local = random_alphanumeric(rng, 10).to_ascii_lowercase();
    }

    Credentials {
        address: format!("{local}@{domain}"),
        password: random_alphanumeric(rng, PASSWORD_LEN),
    }
}

/// Lowercase and keep only `[a-z0-9]`.
pub fn sanitize_local_part(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

fn random_username<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("user");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("mail");
    let sep = SEPARATORS.choose(rng).copied().unwrap_or("");
    let suffix: u16 = rng.gen_range(0..10_000);
    format!("{first}{sep}{last}{suffix}")
}

fn random_alphanumeric<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
