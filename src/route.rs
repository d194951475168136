//! Routes and path templates.
//!
//! A route is an immutable association of an HTTP verb, a path template and a
//! target (a standard capability or a custom action) on one resource. Routes are
//! generated by [`RouteTableBuilder`](crate::RouteTableBuilder); nothing writes
//! them by hand.

use crate::capability::{Capability, HttpMethod, PathShape};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// One segment of a [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    /// The opaque `{id}` wildcard.
    Id,
}

/// A path such as `/widgets/{id}/edit/`, stored as segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Template for a standard capability endpoint on collection `name`.
    pub fn for_shape(name: &str, shape: PathShape) -> Self {
        let mut segments = vec![Segment::Literal(name.to_string())];
        let suffix = match shape {
            PathShape::Collection(suffix) => suffix,
            PathShape::Member(suffix) => {
                segments.push(Segment::Id);
                suffix
            }
        };
        if let Some(suffix) = suffix {
            segments.push(Segment::Literal(suffix.to_string()));
        }
        Self { segments }
    }

    /// Parses a path relative to collection `name`, e.g. `{pk}/browse/`.
    ///
    /// Any `{...}` segment is the identifier wildcard; at most one is allowed.
    /// Returns `None` for malformed paths.
    pub fn for_custom(name: &str, relative: &str) -> Option<Self> {
        let mut segments = vec![Segment::Literal(name.to_string())];
        let mut has_id = false;
        for part in relative.split('/').filter(|p| !p.is_empty()) {
            if part.starts_with('{') && part.ends_with('}') && part.len() > 2 {
                if has_id {
                    return None;
                }
                has_id = true;
                segments.push(Segment::Id);
            } else if part.contains(['{', '}']) {
                return None;
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }
        if segments.len() == 1 {
            return None;
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The resource collection this template belongs to.
    pub fn collection(&self) -> &str {
        match self.segments.first() {
            Some(Segment::Literal(name)) => name,
            _ => "",
        }
    }

    pub fn has_id(&self) -> bool {
        self.segments.contains(&Segment::Id)
    }

    /// Matches request segments; on success returns the captured id, if any.
    pub fn matches<'a>(&self, parts: &[&'a str]) -> Option<Option<&'a str>> {
        if parts.len() != self.segments.len() {
            return None;
        }
        let mut id = None;
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) if literal == part => {}
                Segment::Literal(_) => return None,
                Segment::Id => id = Some(*part),
            }
        }
        Some(id)
    }

    /// Orders templates of equal length so that literal segments beat the
    /// `{id}` wildcard, comparing left to right.
    pub fn specificity_cmp(&self, other: &Self) -> Ordering {
        let literal = |s: &Segment| matches!(s, Segment::Literal(_));
        self.segments
            .iter()
            .map(literal)
            .cmp(other.segments.iter().map(literal))
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => write!(f, "{literal}/")?,
                Segment::Id => f.write_str("{id}/")?,
            }
        }
        Ok(())
    }
}

/// What a route invokes on its resource's handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteTarget {
    Capability(Capability),
    Custom(Arc<str>),
}

impl RouteTarget {
    pub fn name(&self) -> &str {
        match self {
            RouteTarget::Capability(capability) => capability.as_str(),
            RouteTarget::Custom(action) => action,
        }
    }

    pub fn success_status(&self) -> u16 {
        match self {
            RouteTarget::Capability(capability) => capability.success_status(),
            RouteTarget::Custom(_) => 200,
        }
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled (method, path, target) association for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub(crate) name: String,
    pub(crate) method: HttpMethod,
    pub(crate) template: PathTemplate,
    pub(crate) resource: Arc<str>,
    pub(crate) target: RouteTarget,
    pub(crate) summary: String,
}

impl Route {
    /// Stable route name, e.g. `v1_widgets_edit`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Read-only projection for documentation and tests.
    pub fn listing(&self) -> RouteListing {
        RouteListing {
            method: self.method,
            path: self.template.to_string(),
            resource: self.resource.to_string(),
            capability: self.target.name().to_string(),
            name: self.name.clone(),
        }
    }
}

/// One row of the discoverable route listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RouteListing {
    pub method: HttpMethod,
    pub path: String,
    pub resource: String,
    pub capability: String,
    pub name: String,
}

impl fmt::Display for RouteListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<7} {:<32} {}.{}",
            self.method.as_str(),
            self.path,
            self.resource,
            self.capability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_render_with_trailing_slash() {
        let edit = PathTemplate::for_shape("widgets", PathShape::Member(Some("edit")));
        assert_eq!(edit.to_string(), "/widgets/{id}/edit/");
        let index = PathTemplate::for_shape("widgets", PathShape::Collection(None));
        assert_eq!(index.to_string(), "/widgets/");
    }

    #[test]
    fn test_literal_segments_are_more_specific() {
        let new = PathTemplate::for_shape("widgets", PathShape::Collection(Some("new")));
        let show = PathTemplate::for_shape("widgets", PathShape::Member(None));
        assert_eq!(new.specificity_cmp(&show), Ordering::Greater);
        assert_eq!(new.matches(&["widgets", "new"]), Some(None));
        assert_eq!(show.matches(&["widgets", "new"]), Some(Some("new")));
        assert_eq!(show.matches(&["gadgets", "new"]), None);
    }

    #[test]
    fn test_custom_paths() {
        let browse = PathTemplate::for_custom("locations", "{pk}/browse/").unwrap();
        assert_eq!(browse.to_string(), "/locations/{id}/browse/");
        assert!(browse.has_id());
        assert!(PathTemplate::for_custom("locations", "{a}/{b}/").is_none());
        assert!(PathTemplate::for_custom("locations", "x{y}/").is_none());
        assert!(PathTemplate::for_custom("locations", "/").is_none());
    }
}
