//! Target-machine alias policy.
//!
//! Writing some locations also writes others: on x86, a write to `eax`
//! defines `ax`, which in turn defines `al` and `ah`.  The policy lists
//! these overlaps per target.  [`LocationSet`](crate::location_set::LocationSet)
//! consults it on insertion; nothing about a particular processor is
//! compiled into the set itself.
//!
//! A policy can be built in code or loaded from a JSON target description:
//!
//! ```json
//! {
//!   "target": "pentium",
//!   "aliases": [
//!     { "from": { "kind": "reg_of", "id": 24 }, "to": [{ "kind": "reg_of", "id": 0 }] }
//!   ]
//! }
//! ```

use crate::core::oper::Oper;
use crate::errors::ConfigError;
use crate::expr::{Exp, SharedExp};
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Pentium register numbers used by [`AliasPolicy::pentium`].
pub mod pentium {
    pub const AX: i64 = 0;
    pub const CX: i64 = 1;
    pub const DX: i64 = 2;
    pub const BX: i64 = 3;
    pub const SP: i64 = 4;
    pub const BP: i64 = 5;
    pub const SI: i64 = 6;
    pub const DI: i64 = 7;
    pub const AL: i64 = 8;
    pub const CL: i64 = 9;
    pub const DL: i64 = 10;
    pub const BL: i64 = 11;
    pub const AH: i64 = 12;
    pub const CH: i64 = 13;
    pub const DH: i64 = 14;
    pub const BH: i64 = 15;
    pub const EAX: i64 = 24;
    pub const ECX: i64 = 25;
    pub const EDX: i64 = 26;
    pub const EBX: i64 = 27;
    pub const ESP: i64 = 28;
    pub const EBP: i64 = 29;
    pub const ESI: i64 = 30;
    pub const EDI: i64 = 31;
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Identifying operand of a location: a register number or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocId {
    Num(i64),
    Name(String),
}

/// Lookup key of the alias table: location kind plus identifying operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocKey {
    pub kind: Oper,
    pub id: LocId,
}

impl LocKey {
    pub fn reg(num: i64) -> Self {
        LocKey {
            kind: Oper::RegOf,
            id: LocId::Num(num),
        }
    }

    /// Key of `loc`, if its operand is a plain number or name.  Memory
    /// locations with computed addresses have no key.
    pub fn of(loc: &Location) -> Option<Self> {
        let sub = loc.sub_exp();
        let id = match (sub.int_value(), sub.str_value()) {
            (Some(n), _) => LocId::Num(n),
            (None, Some(s)) => LocId::Name(s.to_string()),
            _ => return None,
        };
        Some(LocKey {
            kind: loc.oper(),
            id,
        })
    }

    /// The location this key names, without a procedure link.
    pub fn to_exp(&self) -> SharedExp {
        let sub = match &self.id {
            LocId::Num(n) => Exp::int(*n),
            LocId::Name(s) => Exp::str(s),
        };
        Location::new(self.kind, sub, None).into_exp()
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct AliasEntry {
    from: LocKey,
    to: Vec<LocKey>,
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    #[serde(default)]
    target: String,
    #[serde(default)]
    aliases: Vec<AliasEntry>,
}

/// Per-target table of overlapping locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasPolicy {
    target: String,
    table: HashMap<LocKey, Vec<LocKey>>,
}

impl AliasPolicy {
    /// A policy with no aliases.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn named(target: &str) -> Self {
        AliasPolicy {
            target: target.to_string(),
            table: HashMap::new(),
        }
    }

    /// x86 general-purpose registers: each 32-bit register defines its
    /// 16-bit half, which defines its two byte registers.
    pub fn pentium() -> Self {
        use self::pentium::*;
        let mut p = AliasPolicy::named("pentium");
        for (wide, half) in [
            (EAX, AX),
            (ECX, CX),
            (EDX, DX),
            (EBX, BX),
            (ESP, SP),
            (EBP, BP),
            (ESI, SI),
            (EDI, DI),
        ] {
            p.add_alias(LocKey::reg(wide), LocKey::reg(half));
        }
        for (half, lo, hi) in [(AX, AL, AH), (CX, CL, CH), (DX, DL, DH), (BX, BL, BH)] {
            p.add_alias(LocKey::reg(half), LocKey::reg(lo));
            p.add_alias(LocKey::reg(half), LocKey::reg(hi));
        }
        p
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Declare that writing `from` also defines `to`.
    pub fn add_alias(&mut self, from: LocKey, to: LocKey) {
        let entry = self.table.entry(from).or_default();
        if !entry.contains(&to) {
            entry.push(to);
        }
    }

    /// Direct aliases of `loc` (not transitive).
    pub fn aliases_of(&self, loc: &Location) -> Vec<SharedExp> {
        let Some(key) = LocKey::of(loc) else {
            return Vec::new();
        };
        self.table
            .get(&key)
            .map(|keys| keys.iter().map(LocKey::to_exp).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // -- Loading -----------------------------------------------------------

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: AliasFile = serde_json::from_str(json)?;
        let mut policy = AliasPolicy::named(&file.target);
        for entry in file.aliases {
            if !entry.from.kind.is_location() {
                return Err(ConfigError::InvalidAliasKind(entry.from.kind));
            }
            for to in entry.to {
                if !to.kind.is_location() {
                    return Err(ConfigError::InvalidAliasKind(to.kind));
                }
                policy.add_alias(entry.from.clone(), to);
            }
        }
        log::debug!(
            "loaded alias policy '{}' ({} entries)",
            policy.target,
            policy.table.len()
        );
        Ok(policy)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
