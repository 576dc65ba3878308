//! Deduplicating sets of locations and subscripted locations.
//!
//! Used for use/definition sets in dataflow analysis.  Membership is
//! decided by structural equality: a fresh `r24{3}` finds the `r24{3}`
//! already in the set, while `r24{7}` is a different member.

use crate::alias::AliasPolicy;
use crate::expr::{Exp, SharedExp};
use crate::proc::ProcId;
use crate::refexp::{Def, RefExp};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A set of [`Location`](crate::location::Location) and [`RefExp`] values.
#[derive(Debug, Clone, Default)]
pub struct LocationSet {
    locs: HashSet<SharedExp>,
    policy: Option<Rc<AliasPolicy>>,
}

impl LocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set that also inserts the aliases `policy` lists whenever a bare
    /// location is inserted.
    pub fn with_policy(policy: Rc<AliasPolicy>) -> Self {
        LocationSet {
            locs: HashSet::new(),
            policy: Some(policy),
        }
    }

    pub fn policy(&self) -> Option<&Rc<AliasPolicy>> {
        self.policy.as_ref()
    }

    /// Insert `exp`; returns `true` if it was not already present.
    ///
    /// A bare location also pulls in the whole alias closure the policy
    /// gives for it (aliases, their aliases, and so on), whatever the set
    /// already holds.  Subscripted locations are inserted as they are.
    ///
    /// # Panics
    ///
    /// If `exp` is neither a location nor a subscripted location.
    pub fn insert(&mut self, exp: SharedExp) -> bool {
        assert!(
            exp.is_location() || exp.is_subscript(),
            "LocationSet cannot hold {exp}"
        );
        let aliases = self.alias_closure(&exp);
        let added = self.locs.insert(exp);
        self.locs.extend(aliases);
        added
    }

    /// Every location reachable from `exp` through the alias table, not
    /// including `exp` itself.  The visited set ends cycles.
    fn alias_closure(&self, exp: &SharedExp) -> Vec<SharedExp> {
        let Some(policy) = &self.policy else {
            return Vec::new();
        };
        if !exp.is_location() {
            return Vec::new();
        }
        let mut seen: HashSet<SharedExp> = HashSet::from([exp.clone()]);
        let mut work = vec![exp.clone()];
        let mut closure = Vec::new();
        while let Some(e) = work.pop() {
            let Some(loc) = e.as_location() else {
                continue;
            };
            for alias in policy.aliases_of(loc) {
                if seen.insert(alias.clone()) {
                    closure.push(alias.clone());
                    work.push(alias);
                }
            }
        }
        closure
    }

    pub fn remove(&mut self, exp: &Exp) -> bool {
        self.locs.remove(exp)
    }

    pub fn contains(&self, exp: &Exp) -> bool {
        self.locs.contains(exp)
    }

    pub fn len(&self) -> usize {
        self.locs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locs.is_empty()
    }

    pub fn clear(&mut self) {
        self.locs.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedExp> {
        self.locs.iter()
    }

    // -- Set algebra -------------------------------------------------------

    /// Insert every member of `other` (aliases included).
    pub fn union_with(&mut self, other: &LocationSet) {
        for e in &other.locs {
            self.insert(e.clone());
        }
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &LocationSet) -> LocationSet {
        LocationSet {
            locs: self.locs.difference(&other.locs).cloned().collect(),
            policy: self.policy.clone(),
        }
    }

    // -- Queries -----------------------------------------------------------

    /// First member that is `loc`, ignoring subscripts on either side.
    pub fn find_ns(&self, loc: &Exp) -> Option<&SharedExp> {
        let wanted = loc.base_location()?;
        self.locs
            .iter()
            .find(|e| e.base_location() == Some(wanted))
    }

    /// A member subscripting the same location as `r` with a different
    /// definition.
    pub fn find_different_ref(&self, r: &RefExp) -> Option<&SharedExp> {
        self.locs.iter().find(|e| match e.as_ref_exp() {
            Some(other) => other.sub_exp() == r.sub_exp() && other.def() != r.def(),
            None => false,
        })
    }

    /// `true` if the set holds `loc{-}`.
    pub fn contains_implicit(&self, loc: &SharedExp) -> bool {
        if !loc.is_location() {
            return false;
        }
        let implicit = Exp::Ref(RefExp::new(loc.clone(), Def::Implicit));
        self.locs.contains(&implicit)
    }

    /// Members whose underlying location is attributed to `proc`.
    pub fn locations_for(&self, proc: ProcId) -> impl Iterator<Item = &SharedExp> {
        self.locs
            .iter()
            .filter(move |e| e.base_location().and_then(|l| l.proc()) == Some(proc))
    }

    /// A copy with every bare location subscripted by `def`.  Members that
    /// are already subscripted are kept as they are.
    pub fn add_subscript(&self, def: Def) -> LocationSet {
        let locs = self
            .locs
            .iter()
            .map(|e| {
                if e.is_location() {
                    Exp::subscript(e.clone(), def)
                } else {
                    e.clone()
                }
            })
            .collect();
        LocationSet {
            locs,
            policy: self.policy.clone(),
        }
    }

    /// Members rendered and sorted, for deterministic output.
    pub fn sorted_strings(&self) -> Vec<String> {
        let mut v: Vec<String> = self.locs.iter().map(|e| e.to_string()).collect();
        v.sort();
        v
    }
}

impl PartialEq for LocationSet {
    fn eq(&self, other: &Self) -> bool {
        self.locs == other.locs
    }
}

impl Eq for LocationSet {}

impl Extend<SharedExp> for LocationSet {
    fn extend<I: IntoIterator<Item = SharedExp>>(&mut self, iter: I) {
        for e in iter {
            self.insert(e);
        }
    }
}

impl FromIterator<SharedExp> for LocationSet {
    fn from_iter<I: IntoIterator<Item = SharedExp>>(iter: I) -> Self {
        let mut set = LocationSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a LocationSet {
    type Item = &'a SharedExp;
    type IntoIter = std::collections::hash_set::Iter<'a, SharedExp>;

    fn into_iter(self) -> Self::IntoIter {
        self.locs.iter()
    }
}

impl fmt::Display for LocationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.sorted_strings().join(", "))
    }
}
