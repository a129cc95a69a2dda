//! Registering a shape by hand, without the derive.

use std::sync::OnceLock;

use autodsl::schema::{cached, ShapeCell};
use autodsl::validate;
use autodsl::{
    build, BuilderState, Dsl, DslResult, ElementRef, SchemaError,
    SequenceAdapter, ShapeBuilder, ShapeDescriptor,
};

#[allow(dead_code)]
#[derive(Debug)]
struct Playlist {
    title: String,
    tracks: Vec<String>,
}

struct PlaylistBuilder {
    state: BuilderState,
    title: Option<String>,
    tracks: Option<Vec<String>>,
}

impl PlaylistBuilder {
    fn title(&mut self, value: &str) -> &mut Self {
        if self.state.record_value(0) {
            self.title = Some(value.to_string());
        }
        self
    }

    fn tracks(
        &mut self,
        block: impl FnOnce(&mut autodsl::CollectionBuilder<String, SequenceAdapter>),
    ) -> &mut Self {
        let current = self.tracks.take();
        self.tracks = self
            .state
            .run_collection::<String, _>(1, SequenceAdapter, current, block);
        self
    }
}

impl ShapeBuilder for PlaylistBuilder {
    type Output = Playlist;

    fn from_state(state: BuilderState) -> Self {
        PlaylistBuilder {
            state,
            title: None,
            tracks: None,
        }
    }

    fn state(&self) -> &BuilderState {
        &self.state
    }

    fn finalize(self) -> DslResult<Playlist> {
        validate::finalize(self.state)?;
        Ok(Playlist {
            title: validate::require(self.title, "Playlist", "title")?,
            tracks: validate::require(self.tracks, "Playlist", "tracks")?,
        })
    }
}

impl Dsl for Playlist {
    const SHAPE_NAME: &'static str = "Playlist";
    type Builder = PlaylistBuilder;

    fn shape() -> Result<&'static ShapeDescriptor, SchemaError> {
        static SHAPE: ShapeCell = OnceLock::new();
        cached(&SHAPE, || {
            ShapeDescriptor::declare("Playlist")
                .scalar("title", "String")
                .repeated("tracks", "Vec<String>", ElementRef::value("String"))
                .finish()
        })
    }
}

fn main() {
    println!("=== Runtime Schema Example ===\n");
    println!("{}\n", Playlist::shape().expect("valid shape"));

    let playlist = build::<Playlist>(|p| {
        p.title("Road trip");
        p.tracks(|t| {
            t.add("Intro").add("Highway").add("Outro");
        });
    });
    println!("Built: {:?}", playlist);

    let untitled = build::<Playlist>(|p| {
        p.tracks(|t| {
            t.add("Intro");
        });
    });
    println!("Without a title: {:?}", untitled);

    let broken = ShapeDescriptor::declare("Playlist")
        .scalar("title", "String")
        .optional_scalar("title", "String")
        .finish();
    println!("Duplicate field declaration: {:?}", broken);
}
