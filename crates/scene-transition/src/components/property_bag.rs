//! Property bag: a loosely shaped target, the kind filters and shader
//! uniforms usually are.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::api::error::TransitionError;
use crate::api::props::TransitionProps;
use crate::components::target::{Target, TargetHandle};

/// A number or a named group of further properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Property {
    Number(f64),
    Group(BTreeMap<String, Property>),
}

/// Nested numeric properties addressed by dotted path, plus optional
/// secondary targets and self-carried hooks.
#[derive(Default, Deserialize)]
pub struct PropertyBag {
    #[serde(flatten)]
    values: BTreeMap<String, Property>,
    #[serde(skip)]
    filters: Vec<TargetHandle>,
    #[serde(skip)]
    transitions: Option<Rc<TransitionProps>>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a bag from a JSON object of numbers and nested objects.
    pub fn from_json(json: &str) -> Result<Self, TransitionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Wrap the bag in a shared handle.
    pub fn into_handle(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    // -- Builder pattern --

    /// Insert `value` at `path`, creating intermediate groups.
    pub fn with(mut self, path: &str, value: f64) -> Self {
        self.insert(path, value);
        self
    }

    pub fn with_filter(mut self, filter: TargetHandle) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_transitions(mut self, props: TransitionProps) -> Self {
        self.transitions = Some(Rc::new(props));
        self
    }

    /// Insert `value` at `path`, creating (or replacing) groups on the way.
    pub fn insert(&mut self, path: &str, value: f64) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(leaf) = segments.pop() else {
            return;
        };
        let mut map = &mut self.values;
        for segment in segments {
            let slot = map
                .entry(segment.to_string())
                .or_insert_with(|| Property::Group(BTreeMap::new()));
            if let Property::Number(_) = slot {
                *slot = Property::Group(BTreeMap::new());
            }
            map = match slot {
                Property::Group(children) => children,
                Property::Number(_) => return,
            };
        }
        map.insert(leaf.to_string(), Property::Number(value));
    }

    /// Read the number at `path`.
    pub fn get(&self, path: &str) -> Option<f64> {
        match self.lookup(path)? {
            Property::Number(n) => Some(*n),
            Property::Group(_) => None,
        }
    }

    fn lookup(&self, path: &str) -> Option<&Property> {
        let mut segments = path.split('.');
        let mut node = self.values.get(segments.next()?)?;
        for segment in segments {
            node = match node {
                Property::Group(children) => children.get(segment)?,
                Property::Number(_) => return None,
            };
        }
        Some(node)
    }

    fn lookup_mut(&mut self, path: &str) -> Option<&mut Property> {
        let mut segments = path.split('.');
        let mut node = self.values.get_mut(segments.next()?)?;
        for segment in segments {
            node = match node {
                Property::Group(children) => children.get_mut(segment)?,
                Property::Number(_) => return None,
            };
        }
        Some(node)
    }
}

impl Target for PropertyBag {
    fn property(&self, path: &str) -> Option<f64> {
        self.get(path)
    }

    fn set_property(&mut self, path: &str, value: f64) -> bool {
        match self.lookup_mut(path) {
            Some(Property::Number(n)) => {
                *n = value;
                true
            }
            _ => false,
        }
    }

    fn secondary_targets(&self) -> Vec<TargetHandle> {
        self.filters.clone()
    }

    fn transition_props(&self) -> Option<Rc<TransitionProps>> {
        self.transitions.clone()
    }
}

impl fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBag")
            .field("values", &self.values)
            .field("filters", &self.filters.len())
            .field("transitions", &self.transitions.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_paths_read_and_write() {
        let mut bag = PropertyBag::new().with("uniforms.strength", 0.5).with("blur", 2.0);
        assert_eq!(bag.property("uniforms.strength"), Some(0.5));
        assert!(bag.set_property("uniforms.strength", 0.75));
        assert_eq!(bag.get("uniforms.strength"), Some(0.75));
        assert_eq!(bag.get("blur"), Some(2.0));
    }

    #[test]
    fn missing_paths_fail_for_get_and_set() {
        let mut bag = PropertyBag::new().with("blur", 2.0);
        assert_eq!(bag.property("blur.x"), None);
        assert!(!bag.set_property("blur.x", 1.0));
        assert_eq!(bag.property("quality"), None);
        assert!(!bag.set_property("quality", 1.0));
    }

    #[test]
    fn groups_are_not_numbers() {
        let mut bag = PropertyBag::new().with("offset.x", 1.0);
        assert_eq!(bag.property("offset"), None);
        assert!(!bag.set_property("offset", 3.0));
    }

    #[test]
    fn parse_from_json() {
        let bag = PropertyBag::from_json(r#"{ "alpha": 1, "offset": { "x": 4, "y": -2 } }"#).unwrap();
        assert_eq!(bag.get("alpha"), Some(1.0));
        assert_eq!(bag.get("offset.y"), Some(-2.0));
    }

    #[test]
    fn parse_rejects_non_numbers() {
        let err = PropertyBag::from_json(r#"{ "name": "blur" }"#).unwrap_err();
        assert!(matches!(err, TransitionError::InvalidConfig { .. }));
    }
}
