//! Parent branch identity.

use super::{Customer, IdentityError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The branch a child is created from.
///
/// Only two shapes are accepted: the public mainline `master`, or a
/// customer-specific mainline `custom/<customer>/main`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parent {
    /// The public mainline.
    Master,
    /// A customer-specific mainline, `custom/<customer>/main`.
    Custom(Customer),
}

impl Parent {
    /// Parses a parent branch path.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidParent`] when the value is neither
    /// `master` nor `custom/<customer>/main` with a valid customer name.
    pub fn parse(text: &str) -> Result<Self, IdentityError> {
        if text == "master" {
            return Ok(Self::Master);
        }
        text.strip_prefix("custom/")
            .and_then(|rest| rest.strip_suffix("/main"))
            .and_then(|middle| Customer::new(middle).ok())
            .map(Self::Custom)
            .ok_or_else(|| IdentityError::InvalidParent(text.to_owned()))
    }

    /// Returns the customer scoping this mainline, if any.
    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        match self {
            Self::Master => None,
            Self::Custom(customer) => Some(customer),
        }
    }
}

impl fmt::Display for Parent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Master => f.write_str("master"),
            Self::Custom(customer) => write!(f, "custom/{customer}/main"),
        }
    }
}
