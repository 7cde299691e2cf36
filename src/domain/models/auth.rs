use serde::{Deserialize, Serialize};
use std::fmt;

/// Claims minted by the external identity provider. The core only verifies
/// them; it never issues tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: ActorRole,
    pub iss: String,
    pub exp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Customer,
    Driver,
    Admin,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActorRole::Customer => "customer",
            ActorRole::Driver => "driver",
            ActorRole::Admin => "admin",
        };
        f.write_str(s)
    }
}
