use serde::{Deserialize, Serialize};

use crate::constants::{IMPLICIT_ACCOUNT_LEN, MAX_ACCOUNT_NAME_LEN, MIN_ACCOUNT_NAME_LEN};
use crate::error::AccountIdError;

/// Transaction hash as reported by the wallet.
pub type TxHash = String;

/// Network suffixes accepted for named accounts.
pub const ACCOUNT_SUFFIXES: [&str; 2] = [".near", ".testnet"];

/// An account identifier: `alice.near`, `bob.testnet` or a 64-char hex
/// implicit account.
///
/// Ids typed in by a user go through [`AccountId::parse`]. Ids handed to us
/// by the wallet or read back from the indexer are taken as-is with
/// [`AccountId::from_trusted`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn parse(s: &str) -> Result<Self, AccountIdError> {
        validate_account_id(s)?;
        Ok(Self(s.to_string()))
    }

    pub fn from_trusted(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_implicit(&self) -> bool {
        is_implicit_account(&self.0)
    }

    /// Display form: implicit accounts are cut to `first8...last8`.
    pub fn short(&self) -> String {
        if self.0.len() == IMPLICIT_ACCOUNT_LEN && self.0.is_ascii() {
            format!("{}...{}", &self.0[..8], &self.0[IMPLICIT_ACCOUNT_LEN - 8..])
        } else {
            self.0.clone()
        }
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for AccountId {
    type Err = AccountIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Pure validity predicate for user-supplied account ids.
pub fn is_valid_account_id(s: &str) -> bool {
    validate_account_id(s).is_ok()
}

pub fn validate_account_id(s: &str) -> Result<(), AccountIdError> {
    if s.is_empty() {
        return Err(AccountIdError::Empty);
    }

    if let Some(name) = ACCOUNT_SUFFIXES.iter().find_map(|suffix| s.strip_suffix(suffix)) {
        // `app.alice.near`: the first label carries the length bound, the
        // parent labels only need valid characters.
        let mut labels = name.split('.');
        let first = labels.next().unwrap_or_default();
        let len = first.chars().count();
        if !(MIN_ACCOUNT_NAME_LEN..=MAX_ACCOUNT_NAME_LEN).contains(&len) {
            return Err(AccountIdError::NameLength(len));
        }
        let parents_ok = labels.all(|label| !label.is_empty() && is_name_label(label));
        if !is_name_label(first) || !parents_ok {
            return Err(AccountIdError::InvalidCharacters);
        }
        return Ok(());
    }

    if s.chars().count() == IMPLICIT_ACCOUNT_LEN {
        return if is_implicit_account(s) {
            Ok(())
        } else {
            Err(AccountIdError::InvalidImplicit)
        };
    }

    Err(AccountIdError::MissingSuffix)
}

fn is_name_label(label: &str) -> bool {
    label
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn is_implicit_account(s: &str) -> bool {
    s.len() == IMPLICIT_ACCOUNT_LEN
        && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn network_id(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    pub fn fastfs_contract_id(&self) -> &'static str {
        match self {
            Self::Mainnet => crate::constants::FASTFS_CONTRACT_ID,
            Self::Testnet => "fastfs.testnet",
        }
    }

    pub fn kv_contract_id(&self) -> &'static str {
        match self {
            Self::Mainnet => crate::constants::KV_CONTRACT_ID,
            Self::Testnet => "social.testnet",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_accounts() {
        assert!(is_valid_account_id("alice.near"));
        assert!(is_valid_account_id("bob_1-x.testnet"));
        assert_eq!(
            validate_account_id("AL.near"),
            Err(AccountIdError::InvalidCharacters)
        );
        assert_eq!(validate_account_id("a.near"), Err(AccountIdError::NameLength(1)));
        assert_eq!(validate_account_id(".near"), Err(AccountIdError::NameLength(0)));
        assert!(!is_valid_account_id(&format!("{}.near", "a".repeat(65))));
        assert!(is_valid_account_id(&format!("{}.near", "a".repeat(64))));
    }

    #[test]
    fn test_subaccounts() {
        assert!(is_valid_account_id("app.alice.near"));
        assert!(is_valid_account_id("my-app.v2.bob.testnet"));
        // only the first label has a minimum length
        assert!(is_valid_account_id("ab.c.near"));
        assert_eq!(validate_account_id("a.alice.near"), Err(AccountIdError::NameLength(1)));
        assert_eq!(
            validate_account_id("app.Alice.near"),
            Err(AccountIdError::InvalidCharacters)
        );
        assert_eq!(
            validate_account_id("app..alice.near"),
            Err(AccountIdError::InvalidCharacters)
        );
        assert_eq!(
            validate_account_id("app.alice!.near"),
            Err(AccountIdError::InvalidCharacters)
        );
    }

    #[test]
    fn test_implicit_accounts() {
        let implicit = "0123456789abcdef".repeat(4);
        assert!(is_valid_account_id(&implicit));

        let mut upper = implicit.clone();
        upper.replace_range(10..11, "A");
        assert_eq!(validate_account_id(&upper), Err(AccountIdError::InvalidImplicit));

        let not_hex = "g".repeat(64);
        assert_eq!(validate_account_id(&not_hex), Err(AccountIdError::InvalidImplicit));
    }

    #[test]
    fn test_no_suffix_rejected() {
        assert_eq!(validate_account_id("bob"), Err(AccountIdError::MissingSuffix));
        assert_eq!(validate_account_id(""), Err(AccountIdError::Empty));
    }

    #[test]
    fn test_short_display() {
        let implicit = AccountId::parse(&"ab".repeat(32)).unwrap();
        assert!(implicit.is_implicit());
        assert_eq!(implicit.short(), "abababab...abababab");

        let named = AccountId::parse("alice.near").unwrap();
        assert_eq!(named.short(), "alice.near");
    }

    #[test]
    fn test_serde_transparent() {
        let ids = vec![AccountId::from_trusted("alice.near"), AccountId::from_trusted("bob.near")];
        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, r#"["alice.near","bob.near"]"#);
        let back: Vec<AccountId> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ids);
    }

    #[test]
    fn test_network_parse() {
        assert_eq!("Testnet".parse::<Network>().unwrap(), Network::Testnet);
        assert!("devnet".parse::<Network>().is_err());
        assert_eq!(Network::Testnet.kv_contract_id(), "social.testnet");
    }
}
