//! Sample shapes shared by the integration tests.
#![allow(dead_code)]

use std::collections::{BTreeSet, LinkedList};

use autodsl::{AutoDsl, LinkedListAdapter};

#[derive(AutoDsl, Debug, Clone, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(AutoDsl, Debug, Clone, PartialEq)]
#[auto_dsl(function = "new_address", exclusive(location, landmark))]
pub struct Address {
    #[auto_dsl(into)]
    pub street: String,
    pub zip_code: u32,
    #[auto_dsl(nested)]
    pub location: Option<Location>,
    #[auto_dsl(into)]
    pub landmark: Option<String>,
}

#[derive(AutoDsl, Debug, Clone, PartialEq)]
pub struct Contact {
    #[auto_dsl(into)]
    pub name: String,
}

#[derive(AutoDsl, Debug, Clone, PartialEq)]
pub struct Person {
    #[auto_dsl(into)]
    pub name: String,
    pub age: u32,
    #[auto_dsl(nested)]
    pub address: Option<Address>,
    #[auto_dsl(nested)]
    pub friends: Option<Vec<Person>>,
    pub keys: Option<BTreeSet<String>>,
    #[auto_dsl(nested)]
    pub contact: Option<Contact>,
}

#[derive(AutoDsl, Debug, Clone, PartialEq)]
pub struct Stamp {
    pub names: Option<Vec<String>>,
}

#[derive(AutoDsl, Debug, Clone, PartialEq)]
pub struct Parcel {
    pub items: Vec<String>,
    #[auto_dsl(nested, collection = LinkedListAdapter)]
    pub stamps: Option<LinkedList<Stamp>>,
}

/// Shapes declared away from the ones that use them.
pub mod general {
    use autodsl::AutoDsl;

    /// Plain value type with no DSL of its own.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Attempts {
        pub counter: u32,
    }

    impl Attempts {
        pub fn new(counter: u32) -> Self {
            Attempts { counter }
        }
    }

    #[derive(AutoDsl, Debug, Clone, PartialEq)]
    pub struct Rating {
        pub stars: u8,
    }
}

#[derive(AutoDsl, Debug, Clone, PartialEq)]
pub struct Scores {
    pub points: f64,
    #[auto_dsl(nested)]
    pub rating: Option<general::Rating>,
    pub attempts: Option<general::Attempts>,
}
