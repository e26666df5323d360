mod article;
mod category;
mod draft;

pub use article::{excerpt, read_time, Article, NewArticle, DEFAULT_AUTHOR, EXCERPT_LENGTH};
pub use category::{Category, CategoryFilter};
pub use draft::DraftResult;
