//! Identifier generation for widget instances and templates.
//!
//! Ids look like `<prefix>_<base36 millis><5 random base36 chars>`, e.g.
//! `todo_lx3k9a2f1q7zp`. Callers that need uniqueness against a live
//! collection retry on collision.

use crate::timestamps::now_millis;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 5;

/// Generate a fresh id with the given prefix.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    let millis = u64::try_from(now_millis()).unwrap_or_default();
    let mut id = String::with_capacity(prefix.len() + 1 + 14);
    id.push_str(prefix);
    id.push('_');
    id.push_str(&to_base36(millis));
    id.push_str(&random_suffix());
    id
}

/// Generate an id with `prefix`, retrying until `taken` reports it free.
#[must_use]
pub fn generate_unique_id(prefix: &str, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = generate_id(prefix);
        if !taken(&id) {
            return id;
        }
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

fn random_suffix() -> String {
    let mut bytes = [0u8; RANDOM_SUFFIX_LEN];
    if getrandom::getrandom(&mut bytes).is_err() {
        // Fall back to clock-derived noise; uniqueness is still enforced by callers.
        let nanos = chrono::Utc::now().timestamp_subsec_nanos().to_le_bytes();
        for (i, b) in bytes.iter_mut().enumerate() {
            *b = nanos[i % nanos.len()].wrapping_add(u8::try_from(i).unwrap_or(0));
        }
    }
    bytes
        .iter()
        .map(|b| char::from(BASE36[usize::from(*b) % BASE36.len()]))
        .collect()
}
