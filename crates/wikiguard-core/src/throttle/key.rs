use std::fmt;

/// Scope a failure counter is tracked under.
///
/// Users and addresses live in separate variants, so a user named
/// `10.0.0.1` can never share a counter with the address `10.0.0.1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackingKey {
    User(String),
    Addr(String),
    Global,
}

impl TrackingKey {
    pub fn user(id: impl Into<String>) -> Self {
        TrackingKey::User(id.into())
    }

    pub fn addr(address: impl Into<String>) -> Self {
        TrackingKey::Addr(address.into())
    }
}

impl fmt::Display for TrackingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackingKey::User(id) => write!(f, "user={id}"),
            TrackingKey::Addr(address) => write!(f, "addr={address}"),
            TrackingKey::Global => f.write_str("global"),
        }
    }
}
