use rand::{distributions::Alphanumeric, thread_rng, Rng};
use sha2::{Digest, Sha256};

pub const SALT_LEN: usize = 16;
pub const TOKEN_LEN: usize = 40;

pub fn random_string(len: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

pub fn new_salt() -> String {
    random_string(SALT_LEN)
}

pub fn new_token() -> String {
    random_string(TOKEN_LEN)
}

pub fn hash_with_salt(text: &str, salt: &str) -> String {
    let mut h = Sha256::new();
    h.update(text);
    h.update(salt);
    format!("{:X}", h.finalize())
}

pub fn verify(text: &str, salt: &str, hash: &str) -> bool {
    hash_with_salt(text, salt) == hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_depends_on_salt() {
        let a = hash_with_salt("hunter22", "salt-a");
        assert_eq!(a, hash_with_salt("hunter22", "salt-a"));
        assert_ne!(a, hash_with_salt("hunter22", "salt-b"));
        assert_eq!(a.len(), 64);
        assert!(verify("hunter22", "salt-a", &a));
        assert!(!verify("hunter23", "salt-a", &a));
    }

    #[test]
    fn tokens_are_alphanumeric() {
        let t = new_token();
        assert_eq!(t.len(), TOKEN_LEN);
        assert!(t.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(t, new_token());
        assert_eq!(new_salt().len(), SALT_LEN);
    }
}
