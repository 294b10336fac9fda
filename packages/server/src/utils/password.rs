use rand::{Rng, distr::Alphanumeric};

/// Length of generated temporary passwords for invited accounts.
const TEMP_PASSWORD_LEN: usize = 12;

/// Generate a random alphanumeric temporary password.
pub fn generate_temporary() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
