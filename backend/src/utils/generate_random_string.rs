use rand::{Rng, distributions::Alphanumeric};

/// Generates a random alphanumeric string of the specified length.
///
/// Draws from the thread-local CSPRNG, so the output is suitable for OAuth
/// `state` values and other one-time tokens.
///
/// # Examples
///
/// ```ignore
/// let state = generate_random_string(32);
/// assert_eq!(state.len(), 32);
/// ```
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_and_charset() {
        let value = generate_random_string(32);
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_values_differ() {
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }
}
