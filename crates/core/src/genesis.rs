// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CHAINSTATE-CORE - GENESIS
//
// TOML-encoded bootstrap parameters. u128 values round-trip through TOML
// strings via the amount_toml adapter, grounded in the teacher's own
// `mod u128_toml` in validator_config.rs — TOML has no native 128-bit
// integer type, so both sides of this codebase serialize u128 as decimal
// strings and parse them back on the way in.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use crate::balance_sheet::{Amount, BalanceSheet};
use crate::error::StateError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genesis {
    #[serde(with = "amount_map_toml")]
    pub founder_balances: BalanceSheet,
    #[serde(with = "amount_toml")]
    pub mining_reward: Amount,
    #[serde(with = "amount_toml")]
    pub gas_price: Amount,
    pub difficulty: u32,
    pub trans_per_block: u32,
}

impl Genesis {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StateError::Io(format!("reading genesis file: {e}")))?;
        toml::from_str(&raw).map_err(|e| StateError::Io(format!("parsing genesis toml: {e}")))
    }

    pub fn to_toml_string(&self) -> Result<String, StateError> {
        toml::to_string_pretty(self)
            .map_err(|e| StateError::Io(format!("serializing genesis toml: {e}")))
    }
}

mod amount_toml {
    use crate::balance_sheet::Amount;
    use serde::{de, Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a decimal string or integer amount")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.parse::<Amount>()
                .map_err(|_| de::Error::custom(format!("invalid amount: {v}")))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(v as Amount)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Ok(v as Amount)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

mod amount_map_toml {
    use crate::balance_sheet::{Address, Amount, BalanceSheet};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BalanceSheet, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let stringified: BTreeMap<&Address, String> =
            map.iter().map(|(k, v)| (k, v.to_string())).collect();
        stringified.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BalanceSheet, D::Error>
    where
        D: Deserializer<'de>,
    {
        let stringified: BTreeMap<Address, String> = BTreeMap::deserialize(deserializer)?;
        stringified
            .into_iter()
            .map(|(k, v)| {
                v.parse::<Amount>()
                    .map(|amount| (k, amount))
                    .map_err(|_| serde::de::Error::custom(format!("invalid amount: {v}")))
            })
            .collect()
    }
}
