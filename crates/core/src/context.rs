//! Caller Context

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::uuids::TypedUuid;

/// Authenticated user marker.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Locale tag used to pick translated product names (e.g. `en`, `ar`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale(String);

impl Locale {
    /// Build a locale from a language tag. Tags are normalised to lower case.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self(tag.trim().to_ascii_lowercase())
    }

    /// The normalised language tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("en")
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Identity and locale of the caller, passed explicitly into every cart operation.
///
/// `user` is `None` when nobody is signed in; mutating operations then fail with
/// [`CartError::LoginRequired`](crate::sync::CartError::LoginRequired).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartContext {
    /// Authenticated user, if any.
    pub user: Option<UserUuid>,

    /// Locale for product names.
    pub locale: Locale,
}

impl CartContext {
    /// Context for a signed-in user.
    #[must_use]
    pub fn authenticated(user: UserUuid, locale: Locale) -> Self {
        Self {
            user: Some(user),
            locale,
        }
    }

    /// Context with no signed-in user.
    #[must_use]
    pub fn anonymous(locale: Locale) -> Self {
        Self { user: None, locale }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_is_normalised() {
        assert_eq!(Locale::new(" AR ").as_str(), "ar");
    }

    #[test]
    fn anonymous_context_has_no_user() {
        let ctx = CartContext::anonymous(Locale::default());

        assert!(ctx.user.is_none());
        assert_eq!(ctx.locale.as_str(), "en");
    }
}
