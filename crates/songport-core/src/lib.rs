mod error;
mod media;
mod result;

pub use error::{SongportError, SongportResult};
pub use media::{Catalog, MediaKind};
pub use result::{ConversionDetails, ConversionResult, ItemSummary};
