//! HTML rendering for the home page, the results grid and movie details.
//!
//! Templates are compiled into the binary and rendered with `minijinja`.
//! Every template is registered under an `.html` name so output is
//! auto-escaped.

use anyhow::{Context, Result};
use cine_core::{image_url, Error, ImageSize, MovieDetail};
use minijinja::{context, Environment, Value};

use crate::coordinator::SearchView;

const LAYOUT_TEMPLATE: &str = include_str!("../../templates/layout.html.jinja");
const HOME_TEMPLATE: &str = include_str!("../../templates/home.html.jinja");
const GRID_TEMPLATE: &str = include_str!("../../templates/grid.html.jinja");
const DETAIL_TEMPLATE: &str = include_str!("../../templates/detail.html.jinja");
const NOT_FOUND_TEMPLATE: &str = include_str!("../../templates/not_found.html.jinja");
const ERROR_TEMPLATE: &str = include_str!("../../templates/error.html.jinja");

/// Compiled template set.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Build the template environment. `image_base` is the image host root,
    /// e.g. `https://image.tmdb.org/t/p`.
    pub fn new(image_base: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in [
            ("layout.html", LAYOUT_TEMPLATE),
            ("home.html", HOME_TEMPLATE),
            ("grid.html", GRID_TEMPLATE),
            ("detail.html", DETAIL_TEMPLATE),
            ("not_found.html", NOT_FOUND_TEMPLATE),
            ("error.html", ERROR_TEMPLATE),
        ] {
            env.add_template(name, source)
                .with_context(|| format!("Failed to add template {name}"))?;
        }

        let image_base = image_base.into();
        env.add_filter("image", move |path: Option<String>, size: String| {
            let size = ImageSize::parse(&size).unwrap_or(ImageSize::W500);
            let path = path.filter(|p| is_plain_path(p));
            image_url(&image_base, size, path.as_deref()).map(Value::from_safe_string)
        });
        env.add_filter("rating", rating);

        Ok(Self { env })
    }

    /// Full home page with the search box and the grid for `view`.
    pub fn home(&self, view: &SearchView) -> Result<String> {
        self.render("home.html", context! { view })
    }

    /// Just the results section; swapped into the page on live updates.
    pub fn grid(&self, view: &SearchView) -> Result<String> {
        self.render("grid.html", context! { view })
    }

    pub fn detail(&self, movie: &MovieDetail) -> Result<String> {
        self.render(
            "detail.html",
            context! {
                movie,
                runtime => movie.runtime_display(),
                revenue => movie.revenue_display(),
                trailer_key => movie.trailer_key(),
            },
        )
    }

    pub fn not_found(&self, id: &str) -> Result<String> {
        self.render("not_found.html", context! { id })
    }

    /// Upstream failure page for a movie lookup, with a link that repeats it.
    pub fn detail_error(&self, err: &Error, id: u64) -> Result<String> {
        self.render(
            "error.html",
            context! {
                message => err.to_string(),
                code => err.code(),
                retryable => err.is_retryable(),
                id,
            },
        )
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        self.env
            .get_template(name)
            .and_then(|t| t.render(ctx))
            .with_context(|| format!("Failed to render {name}"))
    }
}

fn rating(value: f64) -> String {
    format!("{value:.1}")
}

/// Image path fragments are emitted unescaped, so only plain file paths pass.
fn is_plain_path(path: &str) -> bool {
    path.bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b'.' | b'_' | b'-'))
}
