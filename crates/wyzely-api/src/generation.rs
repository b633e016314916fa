// Server-generation differences for the identity endpoint.
//
// Field naming and password-hash depth changed across API generations.
// Everything outside this module treats the generation as opaque
// configuration: it asks for the login field name and a transport hash,
// never for the depth itself.

/// Which identity-endpoint generation to speak.
///
/// The hash depth is an external protocol constant, not something to
/// derive locally: the service compares against exactly this many
/// rounds of md5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiGeneration {
    /// Current servers: `email` field, triple-md5 password.
    #[default]
    V2,
    /// Early servers: `user_name` field, double-md5 password.
    Legacy,
}

impl ApiGeneration {
    /// The JSON field carrying the account name at login.
    pub fn login_field(self) -> &'static str {
        match self {
            Self::V2 => "email",
            Self::Legacy => "user_name",
        }
    }

    /// Hash a password for transport.
    pub fn hash_password(self, password: &str) -> String {
        let rounds = match self {
            Self::V2 => 3,
            Self::Legacy => 2,
        };
        let mut digest = password.to_owned();
        for _ in 0..rounds {
            digest = format!("{:x}", md5::compute(digest.as_bytes()));
        }
        digest
    }
}
