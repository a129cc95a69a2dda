use std::collections::LinkedList;

use autodsl::{AutoDsl, Dsl, LinkedListAdapter};

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
struct Stamp {
    names: Option<Vec<String>>,
}

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
struct Parcel {
    items: Vec<String>,
    #[auto_dsl(nested, collection = LinkedListAdapter)]
    stamps: Option<LinkedList<Stamp>>,
}

fn main() {
    println!("=== Custom Collection Example ===\n");

    let usa = stamp(|s| {
        s.names(|n| {
            n.add("USA");
        });
    })
    .expect("Failed to build stamp");

    let parcel = parcel(|b| {
        b.items(|i| {
            i.add("Hello").add("World");
        });
        b.add_stamps(usa);
        b.stamps(|s| {
            s.add_with(|s| {
                s.names(|n| {
                    n.add("ARG");
                });
            });
        });
    })
    .expect("Failed to build parcel");

    println!("Parcel: {:?}", parcel);
    println!("\nDescriptor:\n{}", Parcel::shape().expect("valid shape"));
}
