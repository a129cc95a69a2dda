use autodsl::{AdapterRef, AutoDsl, CollectionAdapter, Dsl};

/// Keeps each entry together with the position it was appended at.
#[derive(Debug, Default, PartialEq)]
pub struct Journal<T>(Vec<(usize, T)>);

#[derive(Default)]
pub struct JournalAdapter;

impl<T> CollectionAdapter<T> for JournalAdapter {
    type Container = Journal<T>;

    fn create(&self) -> Journal<T> {
        Journal(Vec::new())
    }

    fn append(&self, container: &mut Journal<T>, item: T) {
        let position = container.0.len();
        container.0.push((position, item));
    }

    fn len(&self, container: &Journal<T>) -> usize {
        container.0.len()
    }

    fn describe(&self) -> AdapterRef {
        AdapterRef {
            name: "JournalAdapter",
            container: "Journal",
        }
    }
}

#[derive(AutoDsl, Debug)]
pub struct Ledger {
    #[auto_dsl(into)]
    pub owner: String,
    #[auto_dsl(collection = JournalAdapter)]
    pub entries: Journal<i64>,
}

fn main() {
    let ledger = ledger(|l| {
        l.owner("acme");
        l.entries(|e| {
            e.add(10i64).add(-4i64);
        });
    })
    .unwrap();

    assert_eq!(ledger.entries, Journal(vec![(0, 10), (1, -4)]));
    let shape = Ledger::shape().unwrap();
    assert_eq!(
        autodsl::resolve_adapter(shape.field("entries").unwrap()).map(|a| a.name),
        Some("JournalAdapter")
    );
}
