use autodsl::{AutoDsl, Dsl, DslError, StructuralError};

mod inner {
    use autodsl::AutoDsl;

    #[derive(AutoDsl, Debug)]
    #[auto_dsl(rename = "Coordinates")]
    pub(crate) struct Point {
        pub(crate) x: i32,
        pub(crate) y: i32,
    }
}

#[derive(AutoDsl, Debug)]
#[auto_dsl(function = "make_route", exclusive(via, direct))]
struct Route {
    #[auto_dsl(nested)]
    from: inner::Point,
    #[auto_dsl(nested)]
    to: inner::Point,
    #[auto_dsl(nested)]
    via: Option<Vec<inner::Point>>,
    direct: Option<bool>,
    #[auto_dsl(required, into)]
    r#type: Option<String>,
}

fn main() {
    let route = make_route(|r| {
        r.from(|p| {
            p.x(0).y(0);
        });
        r.to(|p| {
            p.x(3).y(4);
        });
        r.direct(true);
        r.r#type("walk");
    })
    .unwrap();
    assert_eq!(route.to.x, 3);
    assert_eq!(route.r#type.as_deref(), Some("walk"));
    assert!(route.via.is_none());

    let err = make_route(|r| {
        r.set_from(inner::point(|p| {
            p.x(1).y(1);
        })
        .unwrap());
        r.to(|p| {
            p.x(2);
        });
    })
    .unwrap_err();
    assert_eq!(
        err.as_structural().map(StructuralError::path),
        Some("Route.to.y".to_string())
    );

    let err = make_route(|r| {
        r.set_from(inner::point(|p| {
            p.x(1).y(1);
        })
        .unwrap());
        r.to(|p| {
            p.x(2).y(2);
        });
    })
    .unwrap_err();
    assert_eq!(
        err,
        DslError::Structural(StructuralError::MissingField {
            shape: "Route",
            field: "type"
        })
    );

    assert_eq!(<inner::Point as Dsl>::SHAPE_NAME, "Coordinates");
    assert_eq!(Route::shape().unwrap().exclusive_groups().len(), 1);
}
