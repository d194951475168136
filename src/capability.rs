//! # Capabilities
//!
//! The fixed vocabulary of operations a resource can support, and the HTTP
//! verbs they are reached through.
//!
//! Every resource in the system is described against the same nine
//! capabilities. A handler advertises the subset it implements as a
//! [`CapabilitySet`]; the route table builder turns each advertised capability
//! into one or two routes following the convention below.
//!
//! | Capability   | Method        | Path                        |
//! |--------------|---------------|-----------------------------|
//! | `create`     | POST          | `/{name}/`                  |
//! | `new`        | GET           | `/{name}/new/`              |
//! | `index`      | GET           | `/{name}/`                  |
//! | `show`       | GET           | `/{name}/{id}/`             |
//! | `update`     | PUT           | `/{name}/{id}/`             |
//! | `edit`       | GET           | `/{name}/{id}/edit/`        |
//! | `delete`     | DELETE        | `/{name}/{id}/`             |
//! | `search`     | SEARCH / POST | `/{name}/` / `/{name}/search/` |
//! | `new_search` | GET           | `/{name}/new_search/`       |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the nine standard operations a resource may support.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Create,
    New,
    Index,
    Show,
    Update,
    Edit,
    Delete,
    Search,
    NewSearch,
}

/// Where a route lives relative to the collection root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathShape {
    /// `/{name}/` or `/{name}/{suffix}/`
    Collection(Option<&'static str>),
    /// `/{name}/{id}/` or `/{name}/{id}/{suffix}/`
    Member(Option<&'static str>),
}

impl Capability {
    /// All capabilities, in route generation order.
    pub const ALL: [Capability; 9] = [
        Capability::Create,
        Capability::New,
        Capability::Index,
        Capability::Show,
        Capability::Update,
        Capability::Edit,
        Capability::Delete,
        Capability::Search,
        Capability::NewSearch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::New => "new",
            Capability::Index => "index",
            Capability::Show => "show",
            Capability::Update => "update",
            Capability::Edit => "edit",
            Capability::Delete => "delete",
            Capability::Search => "search",
            Capability::NewSearch => "new_search",
        }
    }

    /// Capabilities suppressed by a read-only resource.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Capability::Create
                | Capability::New
                | Capability::Update
                | Capability::Edit
                | Capability::Delete
        )
    }

    /// Capabilities suppressed by a non-searchable resource.
    pub fn is_search(self) -> bool {
        matches!(self, Capability::Search | Capability::NewSearch)
    }

    /// The (method, shape) pairs this capability is exposed through.
    ///
    /// `search` is the only capability with two routes; both are generated or
    /// omitted together.
    pub fn endpoints(self) -> &'static [(HttpMethod, PathShape)] {
        use HttpMethod::*;
        use PathShape::*;
        match self {
            Capability::Create => &[(Post, Collection(None))],
            Capability::New => &[(Get, Collection(Some("new")))],
            Capability::Index => &[(Get, Collection(None))],
            Capability::Show => &[(Get, Member(None))],
            Capability::Update => &[(Put, Member(None))],
            Capability::Edit => &[(Get, Member(Some("edit")))],
            Capability::Delete => &[(Delete, Member(None))],
            Capability::Search => &[
                (Search, Collection(None)),
                (Post, Collection(Some("search"))),
            ],
            Capability::NewSearch => &[(Get, Collection(Some("new_search")))],
        }
    }

    /// HTTP status of a successful invocation.
    pub fn success_status(self) -> u16 {
        match self {
            Capability::Create => 201,
            _ => 200,
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known capability.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown capability: {0}")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

/// A set of [`Capability`] values.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet(u16);

impl CapabilitySet {
    pub const EMPTY: CapabilitySet = CapabilitySet(0);
    pub const ALL: CapabilitySet = CapabilitySet(0b1_1111_1111);

    /// `index`, `show`, `search` and `new_search`.
    pub fn read() -> Self {
        [
            Capability::Index,
            Capability::Show,
            Capability::Search,
            Capability::NewSearch,
        ]
        .into_iter()
        .collect()
    }

    pub fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0 |= capability.bit();
        self
    }

    pub fn without(mut self, capability: Capability) -> Self {
        self.0 &= !capability.bit();
        self
    }

    pub fn insert(&mut self, capability: Capability) {
        self.0 |= capability.bit();
    }

    pub fn remove(&mut self, capability: Capability) {
        self.0 &= !capability.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in [`Capability::ALL`] order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }

    /// Keeps only the members for which `keep` holds.
    pub fn filter(self, keep: impl Fn(Capability) -> bool) -> Self {
        self.iter().filter(|c| keep(*c)).collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::EMPTY;
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// The HTTP verbs the route convention uses.
///
/// `SEARCH` is not a standard verb; it is kept as a synonym of
/// `POST /{name}/search/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Search,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Search => "SEARCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a request uses a verb outside the convention (e.g. `PATCH`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported HTTP method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Case-insensitive, so `search` and `SEARCH` are the same verb.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "SEARCH" => Ok(HttpMethod::Search),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_names_round_trip() {
        for capability in Capability::ALL {
            assert_eq!(capability.as_str().parse::<Capability>(), Ok(capability));
        }
        assert!("destroy".parse::<Capability>().is_err());
    }

    #[test]
    fn test_capability_set_operations() {
        let set = CapabilitySet::EMPTY
            .with(Capability::Index)
            .with(Capability::Show)
            .with(Capability::Delete);
        assert_eq!(set.len(), 3);
        assert!(set.contains(Capability::Show));
        assert!(!set.contains(Capability::Create));

        let narrowed = set.filter(|c| !c.is_mutating());
        assert_eq!(
            narrowed.iter().collect::<Vec<_>>(),
            vec![Capability::Index, Capability::Show]
        );
        assert_eq!(CapabilitySet::ALL.len(), 9);
        assert!(CapabilitySet::EMPTY.is_empty());
    }

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("search".parse::<HttpMethod>(), Ok(HttpMethod::Search));
        assert_eq!("Get".parse::<HttpMethod>(), Ok(HttpMethod::Get));
        assert_eq!(
            "patch".parse::<HttpMethod>(),
            Err(UnknownMethod("PATCH".to_string()))
        );
    }

    #[test]
    fn test_search_has_two_endpoints() {
        let endpoints = Capability::Search.endpoints();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].0, HttpMethod::Search);
        assert_eq!(endpoints[1], (HttpMethod::Post, PathShape::Collection(Some("search"))));
    }
}
