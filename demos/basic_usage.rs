use autodsl::AutoDsl;

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
struct Location {
    lat: f64,
    lng: f64,
}

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
#[auto_dsl(function = "new_address")]
struct Address {
    #[auto_dsl(into)]
    street: String,
    zip_code: u32,
    #[auto_dsl(nested)]
    location: Option<Location>,
}

#[allow(dead_code)]
#[derive(AutoDsl, Debug)]
struct Person {
    #[auto_dsl(into)]
    name: String,
    age: u32,
    #[auto_dsl(nested)]
    address: Option<Address>,
    #[auto_dsl(nested)]
    friends: Option<Vec<Person>>,
}

fn main() {
    println!("=== Basic Usage Example ===\n");

    let me = person(|p| {
        p.name("Juan").age(34);
        p.address(|a| {
            a.street("200 Celebration Bv").zip_code(34747);
            a.location(|l| {
                l.lat(100.0).lng(100.0);
            });
        });
        p.friends(|f| {
            f.add_with(|p| {
                p.name("Arturo").age(30);
            });
            f.add_with(|p| {
                p.name("Tiwa").age(31);
            });
        });
    })
    .expect("Failed to build person");

    println!("Person: {:#?}", me);

    let office = new_address(|a| {
        a.street("1 Infinite Loop").zip_code(95014);
    })
    .expect("Failed to build address");

    println!("\nAddress without location: {:?}", office);
}
