//! Avatar key derivation.

/// Returns the Gravatar key for an email address.
///
/// The address is trimmed and lowercased before hashing, so equivalent
/// spellings of one address share a key. The raw address never leaves this
/// function.
///
/// # Example
///
/// ```
/// use marginalia::comment::gravatar_hash;
///
/// assert_eq!(
///     gravatar_hash(" Bob@Example.com "),
///     gravatar_hash("bob@example.com")
/// );
/// ```
#[must_use]
pub fn gravatar_hash(email: &str) -> String {
    let normalised = email.trim().to_lowercase();
    format!("{:x}", md5::compute(normalised.as_bytes()))
}
