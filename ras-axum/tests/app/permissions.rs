use ras_core::models::{SupplierId, UserId};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

// In order to test the correctness of our permission checks in our endpoints,
// we define a declarative permission scheme, which is encoded as plain text
// into the `Authorization: Bearer <...>` header. This allows us to easily
// construct "tokens" for buyers and suppliers without signing anything.
#[derive(Serialize, Deserialize, Default)]
pub struct Permissions {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub supplier_id: Option<SupplierId>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub manager: bool,
}

impl Permissions {
    pub fn manager() -> Self {
        Self {
            user_id: Some(uuid::Uuid::new_v4().into()),
            manager: true,
            ..Default::default()
        }
    }

    pub fn supplier(name: &str) -> Self {
        Self {
            user_id: Some(uuid::Uuid::new_v4().into()),
            supplier_id: Some(uuid::Uuid::new_v4().into()),
            supplier_name: Some(name.to_owned()),
            manager: false,
        }
    }
}

impl Display for Permissions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", serde_html_form::to_string(self).unwrap())
    }
}

impl FromStr for Permissions {
    type Err = serde_html_form::de::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let deserializer = serde_html_form::Deserializer::new(form_urlencoded::parse(s.as_bytes()));
        Self::deserialize(deserializer)
    }
}
