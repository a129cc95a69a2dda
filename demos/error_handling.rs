use autodsl::{AutoDsl, DslError};
use tracing_subscriber::EnvFilter;

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
struct Location {
    lat: f64,
    lng: f64,
}

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
#[auto_dsl(exclusive(location, landmark))]
struct Address {
    #[auto_dsl(into)]
    street: String,
    zip_code: u32,
    #[auto_dsl(nested)]
    location: Option<Location>,
    #[auto_dsl(into)]
    landmark: Option<String>,
}

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
struct Person {
    #[auto_dsl(into)]
    name: String,
    age: u32,
    #[auto_dsl(nested)]
    address: Option<Address>,
}

fn report(label: &str, result: Result<impl std::fmt::Debug, DslError>) {
    match result {
        Ok(value) => println!("{label}:\n   Success: {value:?}\n"),
        Err(DslError::Structural(err)) => {
            println!("{label}:\n   Error: {err}\n   At: {}\n", err.path())
        }
        Err(err) => println!("{label}:\n   Error: {err}\n"),
    }
}

fn main() {
    // RUST_LOG=autodsl=debug shows each block and rejection.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Error Handling Example ===\n");

    report(
        "1. Complete person",
        person(|p| {
            p.name("Juan").age(34);
        }),
    );

    report(
        "2. Missing age",
        person(|p| {
            p.name("Pepe");
        }),
    );

    report(
        "3. Nested address missing its zip code",
        person(|p| {
            p.name("Juan").age(34);
            p.address(|a| {
                a.street("Street");
            });
        }),
    );

    report(
        "4. Location and landmark together",
        address(|a| {
            a.street("Street").zip_code(1000).landmark("Old mill");
            a.location(|l| {
                l.lat(1.0).lng(2.0);
            });
        }),
    );

    println!("5. Using Result propagation:");
    match create_household() {
        Ok(people) => println!("   Created {} people\n", people.len()),
        Err(e) => println!("   Failed: {}\n", e),
    }
}

fn create_household() -> Result<Vec<Person>, DslError> {
    let first = person(|p| {
        p.name("Ana").age(40);
    })?;
    let second = person(|p| {
        p.name("Luis");
    })?;
    Ok(vec![first, second])
}
