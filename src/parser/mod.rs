pub mod frontmatter;
pub mod record;
pub mod wikilink;

pub use frontmatter::{
    normalize_content, render_record, split_record, FramingError, HeaderLevel, RecordDocument,
};
pub use record::{parse_record, parse_theorem, ParseError, RecordError};
pub use wikilink::{derive_title, title_from_link};
