pub mod renderer;
pub mod scaffold;

pub use renderer::DocumentRenderer;
pub use scaffold::{load_article_fixture, parse_article_fixture, scaffold};
