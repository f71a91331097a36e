#[derive(Debug, Clone, serde::Serialize)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        if !is_valid_email(&email) {
            return Err(format!("{} is not a valid subscriber email", email));
        }

        Ok(Self(email))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Accepted: exactly one '@', a non-empty local part, and a domain with at
// least one '.' and no empty dot-separated segments.
fn is_valid_email(email: &str) -> bool {
    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|segment| !segment.is_empty())
}
