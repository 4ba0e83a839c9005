pub mod conversions;
mod error;
mod http_mapping;
pub mod keys;
mod record;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use keys::{classify_sort_key, decode_key, encode_key, EntityRef, Id, ItemKey, KeyError, RecordKind};
pub use record::{decode_record, Record};
pub use traits::{BlobStore, ItemStore};
pub use types::{AttrValue, Cursor, Item, Page, PutCondition};
