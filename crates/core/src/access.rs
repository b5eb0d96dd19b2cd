//! Password gate for the public tracking link.
//!
//! The access password is a plaintext shared secret compared by simple
//! string equality. It deters casual link sharing; it is not an
//! access-control boundary (no hashing, no rate limiting, the owner can
//! read it back).

/// Whether a project's tracking page is gated.
pub fn is_locked(access_password: Option<&str>) -> bool {
    access_password.is_some_and(|p| !p.is_empty())
}

/// Whether `supplied` opens a project gated by `access_password`.
///
/// Ungated projects are always open.
pub fn grants_access(access_password: Option<&str>, supplied: Option<&str>) -> bool {
    match access_password {
        Some(expected) if !expected.is_empty() => supplied == Some(expected),
        _ => true,
    }
}

/// Normalize an owner-submitted password: blank clears the gate.
pub fn normalize_password(input: Option<&str>) -> Option<String> {
    input.filter(|p| !p.is_empty()).map(str::to_string)
}
